use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use log::info;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, KeyboardEvent, TouchEvent, WheelEvent};

use crate::dom::listener::{cancelable, prevent};
use crate::dom::reveal::element_list;
use crate::dom::scheduler::Scheduled;
use crate::error::{SiteError, SiteResult};
use crate::slides::input::NavCommand;
use crate::slides::navigator::{SlideConfig, SlideNavigator, SlideRole, SlideSurface, ROLE_CLASSES};

const LOADER_DELAY_MS: u32 = 1500;
const RESIZE_DEBOUNCE_MS: u32 = 250;

fn html_elements(list: Vec<Element>) -> Vec<HtmlElement> {
    list.into_iter()
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .collect()
}

pub struct DomSlides {
    slides: Vec<HtmlElement>,
    dots: Vec<(usize, Element)>,
    previous: Option<HtmlButtonElement>,
    next: Option<HtmlButtonElement>,
    progress: Option<HtmlElement>,
    content_selector: String,
}

impl DomSlides {
    fn content(&self, index: usize) -> Vec<HtmlElement> {
        self.slides
            .get(index)
            .and_then(|slide| slide.query_selector_all(&self.content_selector).ok())
            .map(|list| html_elements(element_list(list)))
            .unwrap_or_default()
    }
}

impl SlideSurface for DomSlides {
    fn apply_role(&mut self, index: usize, role: SlideRole) {
        let classes = self.slides[index].class_list();
        for class in ROLE_CLASSES {
            let _ = classes.remove_1(class);
        }
        if let Some(class) = role.class_name() {
            let _ = classes.add_1(class);
        }
    }

    fn apply_background(&mut self, index: usize, background: &str) {
        let _ = self.slides[index].style().set_property("background", background);
    }

    fn mark_indicator(&mut self, current: usize) {
        for (target, dot) in &self.dots {
            let _ = dot.class_list().toggle_with_force("active", *target == current);
        }
    }

    fn set_controls(&mut self, previous_disabled: bool, next_disabled: bool) {
        if let Some(button) = &self.previous {
            button.set_disabled(previous_disabled);
        }
        if let Some(button) = &self.next {
            button.set_disabled(next_disabled);
        }
    }

    fn set_progress(&mut self, fraction: f64) {
        if let Some(bar) = &self.progress {
            let _ = bar.style().set_property("width", &format!("{}%", fraction * 100.0));
        }
    }

    fn content_len(&self, index: usize) -> usize {
        self.content(index).len()
    }

    fn hide_content(&mut self, index: usize) {
        for item in self.content(index) {
            let style = item.style();
            let _ = style.remove_property("transition");
            let _ = style.set_property("opacity", "0");
            let _ = style.set_property("transform", "translateY(30px)");
        }
    }

    fn show_content_item(&mut self, index: usize, item: usize) {
        if let Some(el) = self.content(index).get(item) {
            let style = el.style();
            let _ = style.set_property("transition", "opacity 0.6s ease, transform 0.6s ease");
            let _ = style.set_property("opacity", "1");
            let _ = style.set_property("transform", "translateY(0)");
        }
    }
}

/// Keeps the navigator and its listeners alive; dropping listeners detaches them.
pub struct SlidesHandle {
    navigator: Scheduled<SlideNavigator<DomSlides>>,
    listeners: Vec<EventListener>,
    timers: Vec<Timeout>,
}

impl SlidesHandle {
    pub fn go_to(&self, index: usize) -> bool {
        self.navigator
            .with(|nav, now| nav.go_to(index, now))
            .unwrap_or(false)
    }

    pub fn current_index(&self) -> usize {
        self.navigator.read(|nav| nav.current_index())
    }

    pub fn teardown(&mut self) {
        self.listeners.clear();
        self.timers.clear();
        self.navigator.cancel();
    }
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

pub fn install(config: &SlideConfig) -> SiteResult<Option<SlidesHandle>> {
    let window = web_sys::window().ok_or(SiteError::NoWindow)?;
    let document = window.document().ok_or(SiteError::NoWindow)?;

    let slides = html_elements(element_list(document.query_selector_all(&config.slide_selector)?));
    if slides.is_empty() {
        return Ok(None);
    }
    let backgrounds = slides.iter().map(|s| s.get_attribute("data-bg")).collect();

    let dot_elements = element_list(document.query_selector_all(&config.dot_selector)?);
    let dots: Vec<(usize, Element)> = dot_elements
        .into_iter()
        .enumerate()
        .map(|(i, dot)| {
            let target = dot
                .get_attribute("data-slide")
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .unwrap_or(i);
            (target, dot)
        })
        .collect();

    let previous = query(&document, &config.previous_selector).and_then(|el| el.dyn_into::<HtmlButtonElement>().ok());
    let next = query(&document, &config.next_selector).and_then(|el| el.dyn_into::<HtmlButtonElement>().ok());
    let progress = query(&document, &config.progress_selector).and_then(|el| el.dyn_into::<HtmlElement>().ok());

    let surface = DomSlides {
        slides,
        dots: dots.clone(),
        previous: previous.clone(),
        next: next.clone(),
        progress,
        content_selector: config.content_selector.clone(),
    };
    let navigator = Scheduled::new(SlideNavigator::new(backgrounds, surface)?);
    let mut timers = Vec::new();
    let mut listeners = Vec::new();

    {
        let nav = navigator.clone();
        listeners.push(cancelable(&window, "wheel", move |event| {
            prevent(event);
            if let Some(wheel) = event.dyn_ref::<WheelEvent>() {
                let delta = wheel.delta_y();
                nav.with(|nav, now| nav.on_wheel(delta, now));
            }
        }));
    }
    {
        let nav = navigator.clone();
        listeners.push(EventListener::new(&window, "touchstart", move |event| {
            if let Some(touch) = event
                .dyn_ref::<TouchEvent>()
                .and_then(|t| t.touches().get(0))
            {
                let y = touch.client_y() as f64;
                nav.with(|nav, _| nav.on_touch_start(y));
            }
        }));
    }
    {
        let nav = navigator.clone();
        listeners.push(cancelable(&window, "touchend", move |event| {
            if let Some(touch) = event
                .dyn_ref::<TouchEvent>()
                .and_then(|t| t.changed_touches().get(0))
            {
                let y = touch.client_y() as f64;
                if nav.with(|nav, now| nav.on_touch_end(y, now)) == Some(true) {
                    prevent(event);
                }
            }
        }));
    }
    {
        let nav = navigator.clone();
        listeners.push(cancelable(&window, "keydown", move |event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|k| k.key()) {
                if nav.with(|nav, now| nav.on_key(&key, now)) == Some(true) {
                    prevent(event);
                }
            }
        }));
    }

    for (target, dot) in dots {
        let nav = navigator.clone();
        listeners.push(EventListener::new(&dot, "click", move |_| {
            nav.with(|nav, now| nav.dispatch(NavCommand::GoTo(target), now));
        }));
    }
    let buttons = [(previous, NavCommand::Previous), (next, NavCommand::Next)];
    for (button, command) in buttons {
        if let Some(button) = button {
            let nav = navigator.clone();
            listeners.push(EventListener::new(&button, "click", move |_| {
                nav.with(|nav, now| nav.dispatch(command, now));
            }));
        }
    }
    if let Some(cta) = query(&document, &config.cta_selector) {
        let nav = navigator.clone();
        let target = config.cta_target;
        listeners.push(EventListener::new(&cta, "click", move |_| {
            nav.with(|nav, now| nav.follow_cta(target, now));
        }));
    }

    {
        let nav = navigator.clone();
        let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
        listeners.push(EventListener::new(&window, "resize", move |_| {
            let nav = nav.clone();
            let timeout = Timeout::new(RESIZE_DEBOUNCE_MS, move || {
                nav.with(|nav, _| nav.refresh_progress());
            });
            // replacing the previous timeout cancels it
            *pending.borrow_mut() = Some(timeout);
        }));
    }

    if let Some(loader) = query(&document, &config.loader_selector) {
        timers.push(Timeout::new(LOADER_DELAY_MS, move || {
            let _ = loader.class_list().add_1("hidden");
        }));
    }

    let count = navigator.read(|nav| nav.len());
    info!("slide navigator installed with {} slides", count);
    Ok(Some(SlidesHandle {
        navigator,
        listeners,
        timers,
    }))
}
