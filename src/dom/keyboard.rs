use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions};

use crate::components::keyboard::{InputModality, KeyboardConfig};
use crate::components::scroll::anchor_target;
use crate::dom::listener::{cancelable, prevent};
use crate::dom::reveal::element_list;
use crate::error::{SiteError, SiteResult};

pub struct KeyboardHandle {
    _listeners: Vec<EventListener>,
}

/// Skip links plus the body class that shows focus rings only to keyboard users.
pub fn install(config: &KeyboardConfig) -> SiteResult<Option<KeyboardHandle>> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(SiteError::NoWindow)?;
    let Some(body) = document.body() else {
        return Ok(None);
    };

    let mut listeners = Vec::new();
    for link in element_list(document.query_selector_all(&config.skip_link_selector)?) {
        let document = document.clone();
        let source = link.clone();
        listeners.push(cancelable(&link, "click", move |event| {
            let href = source.get_attribute("href").unwrap_or_default();
            let Some(target) = anchor_target(&href)
                .and_then(|selector| document.query_selector(selector).ok().flatten())
            else {
                return;
            };
            prevent(event);
            if let Some(focusable) = target.dyn_ref::<HtmlElement>() {
                let _ = focusable.focus();
            }
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            target.scroll_into_view_with_scroll_into_view_options(&options);
        }));
    }

    let modality = Rc::new(RefCell::new(InputModality::default()));
    {
        let modality = modality.clone();
        let body = body.clone();
        let class = config.keyboard_class.clone();
        listeners.push(EventListener::new(&document, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(keyboard) = modality.borrow_mut().on_key(&key.key()) {
                let _ = body.class_list().toggle_with_force(&class, keyboard);
            }
        }));
    }
    {
        let class = config.keyboard_class.clone();
        listeners.push(EventListener::new(&document, "mousedown", move |_| {
            if let Some(keyboard) = modality.borrow_mut().on_pointer() {
                let _ = body.class_list().toggle_with_force(&class, keyboard);
            }
        }));
    }

    Ok(Some(KeyboardHandle { _listeners: listeners }))
}
