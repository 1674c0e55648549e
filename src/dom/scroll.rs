use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, FocusOptions, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use crate::components::scroll::{anchor_target, scroll_destination, to_top_visible, ScrollConfig, FOCUS_DELAY};
use crate::dom::listener::{cancelable, prevent, FrameThrottle};
use crate::dom::reveal::element_list;
use crate::error::{SiteError, SiteResult};

const TO_TOP_ICON: &str = r#"<svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" aria-hidden="true"><polyline points="18 15 12 9 6 15"></polyline></svg>"#;

const TO_TOP_STYLE: [(&str, &str); 13] = [
    ("position", "fixed"),
    ("bottom", "2rem"),
    ("right", "2rem"),
    ("width", "3rem"),
    ("height", "3rem"),
    ("border-radius", "50%"),
    ("border", "none"),
    ("cursor", "pointer"),
    ("z-index", "1000"),
    ("display", "flex"),
    ("align-items", "center"),
    ("justify-content", "center"),
    ("transition", "all 0.3s ease"),
];

fn smooth_scroll(window: &Window, top: f64) {
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

fn lookup(document: &Document, selector: &str) -> Option<HtmlElement> {
    // ids such as "#1-intro" are not valid selectors; those links keep their default jump
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

pub struct AnchorHandle {
    listeners: Vec<EventListener>,
    focus: Rc<RefCell<Option<Timeout>>>,
}

impl AnchorHandle {
    pub fn teardown(&mut self) {
        self.listeners.clear();
        self.focus.borrow_mut().take();
    }
}

/// Smooth scrolling for in-page links, stopping short of the fixed header and
/// handing focus to the target once the scroll has settled.
pub fn install_anchors(config: &ScrollConfig) -> SiteResult<Option<AnchorHandle>> {
    let window = web_sys::window().ok_or(SiteError::NoWindow)?;
    let document = window.document().ok_or(SiteError::NoWindow)?;

    let links = element_list(document.query_selector_all(&config.anchor_selector)?);
    if links.is_empty() {
        debug!("no in-page links on this page");
        return Ok(None);
    }
    if let Some(root) = document.document_element().and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
        let _ = root.style().set_property("scroll-behavior", "smooth");
    }

    let focus = Rc::new(RefCell::new(None));
    let mut listeners = Vec::with_capacity(links.len());
    for link in links {
        let window = window.clone();
        let document = document.clone();
        let focus = focus.clone();
        let offset = config.anchor_offset;
        let source = link.clone();
        listeners.push(cancelable(&link, "click", move |event| {
            let Some(href) = source.get_attribute("href") else {
                return;
            };
            let Some(target) = anchor_target(&href).and_then(|selector| lookup(&document, selector)) else {
                return;
            };
            prevent(event);

            let top = target.get_bounding_client_rect().top() + window.scroll_y().unwrap_or(0.0);
            smooth_scroll(&window, scroll_destination(top, offset));

            let timeout = Timeout::new(FOCUS_DELAY.as_millis() as u32, move || {
                let options = FocusOptions::new();
                options.set_prevent_scroll(true);
                let _ = target.focus_with_options(&options);
            });
            // a newer click supersedes a pending focus
            *focus.borrow_mut() = Some(timeout);
        }));
    }

    Ok(Some(AnchorHandle { listeners, focus }))
}

pub struct ToTopHandle {
    button: HtmlElement,
    listeners: Vec<EventListener>,
    _throttle: Rc<FrameThrottle>,
}

impl ToTopHandle {
    pub fn teardown(&mut self) {
        self.listeners.clear();
        self.button.remove();
    }
}

fn show_to_top(button: &HtmlElement, visible: bool) {
    let _ = button.class_list().toggle_with_force("visible", visible);
    let style = button.style();
    let (opacity, visibility, transform) = if visible {
        ("1", "visible", "translateY(0)")
    } else {
        ("0", "hidden", "translateY(20px)")
    };
    let _ = style.set_property("opacity", opacity);
    let _ = style.set_property("visibility", visibility);
    let _ = style.set_property("transform", transform);
}

/// Adds a floating back-to-top button that appears once the page is scrolled.
pub fn install_to_top(config: &ScrollConfig) -> SiteResult<Option<ToTopHandle>> {
    if !config.to_top_enabled {
        return Ok(None);
    }
    let window = web_sys::window().ok_or(SiteError::NoWindow)?;
    let document = window.document().ok_or(SiteError::NoWindow)?;
    let body = document
        .body()
        .ok_or_else(|| SiteError::Dom("document has no body".to_string()))?;

    let button = document
        .create_element("button")?
        .dyn_into::<HtmlElement>()
        .map_err(|_| SiteError::Dom("button is not an HTML element".to_string()))?;
    button.set_class_name("scroll-to-top");
    button.set_attribute("type", "button")?;
    button.set_attribute("aria-label", &config.to_top_label)?;
    button.set_inner_html(TO_TOP_ICON);
    let style = button.style();
    for (property, value) in TO_TOP_STYLE {
        style.set_property(property, value)?;
    }
    show_to_top(&button, false);
    body.append_child(&button)?;

    let throttle = {
        let window = window.clone();
        let button = button.clone();
        let threshold = config.to_top_after;
        let update = move || {
            let y = window.scroll_y().unwrap_or(0.0);
            show_to_top(&button, to_top_visible(y, threshold));
        };
        Rc::new(FrameThrottle::new(update))
    };
    throttle.request();

    let mut listeners = Vec::new();
    {
        let throttle = throttle.clone();
        listeners.push(EventListener::new(&window, "scroll", move |_| throttle.request()));
    }
    {
        let window = window.clone();
        listeners.push(cancelable(&button, "click", move |event| {
            prevent(event);
            smooth_scroll(&window, 0.0);
        }));
    }

    Ok(Some(ToTopHandle {
        button,
        listeners,
        _throttle: throttle,
    }))
}
