use std::rc::Rc;

use gloo_events::EventListener;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, Window};

use crate::components::parallax::{offset, parse_speed, transform, ParallaxConfig};
use crate::dom::listener::FrameThrottle;
use crate::dom::reveal::element_list;
use crate::error::{SiteError, SiteResult};

struct Layer {
    element: HtmlElement,
    speed: f64,
}

pub struct ParallaxHandle {
    _listeners: Vec<EventListener>,
    _throttle: Rc<FrameThrottle>,
}

fn place(layers: &[Layer], window: &Window) {
    let scroll_top = window.page_y_offset().unwrap_or(0.0);
    for layer in layers {
        let _ = layer
            .element
            .style()
            .set_property("transform", &transform(offset(scroll_top, layer.speed)));
    }
}

pub fn install(config: &ParallaxConfig) -> SiteResult<Option<ParallaxHandle>> {
    let window = web_sys::window().ok_or(SiteError::NoWindow)?;
    let document = window.document().ok_or(SiteError::NoWindow)?;

    let layers: Vec<Layer> = element_list(document.query_selector_all(&config.selector)?)
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .map(|element| {
            let speed = parse_speed(element.get_attribute("data-speed").as_deref(), config.default_speed);
            Layer { element, speed }
        })
        .collect();
    if layers.is_empty() {
        debug!("no parallax layers on this page");
        return Ok(None);
    }
    let layers = Rc::new(layers);

    place(&layers, &window);

    let throttle = {
        let layers = layers.clone();
        let window = window.clone();
        Rc::new(FrameThrottle::new(move || place(&layers, &window)))
    };

    let mut listeners = Vec::new();
    {
        let throttle = throttle.clone();
        listeners.push(EventListener::new(&window, "scroll", move |_| throttle.request()));
    }
    {
        let layers = layers.clone();
        listeners.push(EventListener::new(&window, "resize", move |_| {
            for layer in layers.iter() {
                let _ = layer.element.style().set_property("transform", &transform(0.0));
            }
        }));
    }
    {
        let layers = layers.clone();
        let doc = document.clone();
        listeners.push(EventListener::new(&document, "visibilitychange", move |_| {
            let state = if doc.hidden() { "paused" } else { "running" };
            for layer in layers.iter() {
                let _ = layer.element.style().set_property("animation-play-state", state);
            }
        }));
    }

    debug!("parallax on {} layers", layers.len());
    Ok(Some(ParallaxHandle {
        _listeners: listeners,
        _throttle: throttle,
    }))
}
