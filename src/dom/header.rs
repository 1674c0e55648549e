use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, Window};

use crate::components::header::{HeaderConfig, HeaderTracker};
use crate::dom::listener::FrameThrottle;
use crate::error::{SiteError, SiteResult};

pub struct HeaderHandle {
    _scroll: EventListener,
    _throttle: Rc<FrameThrottle>,
}

fn scroll_y(window: &Window) -> f64 {
    window.page_y_offset().unwrap_or(0.0)
}

pub fn install(config: &HeaderConfig) -> SiteResult<Option<HeaderHandle>> {
    let window = web_sys::window().ok_or(SiteError::NoWindow)?;
    let document = window.document().ok_or(SiteError::NoWindow)?;
    let Some(header) = document
        .query_selector(&config.selector)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        debug!("no {} on this page", config.selector);
        return Ok(None);
    };

    let tracker = Rc::new(RefCell::new(HeaderTracker::new(config, scroll_y(&window))));
    let scrolled_class = config.scrolled_class.clone();
    let throttle = {
        let window = window.clone();
        Rc::new(FrameThrottle::new(move || {
            let state = tracker.borrow_mut().update(scroll_y(&window));
            let _ = header
                .class_list()
                .toggle_with_force(&scrolled_class, state.scrolled);
            let _ = header.style().set_property("transform", state.transform());
        }))
    };

    let scroll = {
        let throttle = throttle.clone();
        EventListener::new(&window, "scroll", move |_| throttle.request())
    };

    Ok(Some(HeaderHandle {
        _scroll: scroll,
        _throttle: throttle,
    }))
}
