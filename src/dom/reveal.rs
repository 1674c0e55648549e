use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, NodeList};

use crate::dom::scheduler::Scheduled;
use crate::error::{SiteError, SiteResult};
use crate::reveal::engine::{RevealConfig, RevealEngine, RevealHost, RevealState, RevealStatistics, RevealTarget};

const STYLE_ELEMENT_ID: &str = "scroll-animations-styles";
const SLOT_ATTRIBUTE: &str = "data-reveal-slot";

pub fn element_list(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub struct DomRevealHost {
    document: Document,
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl RevealHost for DomRevealHost {
    type Node = Element;

    fn select_all(&self, selectors: &str) -> Vec<Element> {
        match self.document.query_selector_all(selectors) {
            Ok(list) => element_list(list),
            Err(e) => {
                warn!("bad reveal selector {:?}: {:?}", selectors, e);
                Vec::new()
            }
        }
    }

    fn select_within(&self, parent: &Element, selectors: &str) -> Vec<Element> {
        parent
            .query_selector_all(selectors)
            .map(element_list)
            .unwrap_or_default()
    }

    fn select_first(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn delay_attribute(&self, node: &Element) -> Option<String> {
        node.get_attribute("data-delay")
    }

    fn slot(&self, node: &Element) -> Option<usize> {
        node.get_attribute(SLOT_ATTRIBUTE)?.parse().ok()
    }

    fn set_slot(&mut self, node: &Element, slot: usize) {
        let _ = node.set_attribute(SLOT_ATTRIBUTE, &slot.to_string());
    }

    fn set_state(&mut self, node: &Element, state: RevealState) {
        let _ = node.set_attribute("data-scroll-animation", state.as_str());
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn observe(&mut self, node: &Element) {
        self.observer.observe(node);
    }

    fn unobserve(&mut self, node: &Element) {
        self.observer.unobserve(node);
    }

    fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

type EngineSlot = Rc<RefCell<Option<Scheduled<RevealEngine<DomRevealHost>>>>>;

/// Owner of the page's reveal engine.
pub struct RevealHandle {
    engine: Scheduled<RevealEngine<DomRevealHost>>,
    slot: EngineSlot,
    document: Document,
}

impl RevealHandle {
    /// Picks up marked elements inserted since the last scan.
    pub fn refresh(&self) -> usize {
        self.engine.with(|engine, _| engine.refresh()).unwrap_or(0)
    }

    pub fn force_reveal(&self, selector: &str) -> bool {
        self.engine
            .with(|engine, now| engine.force_reveal(RevealTarget::Selector(selector), now))
            .unwrap_or(false)
    }

    pub fn force_reveal_element(&self, element: Element) -> bool {
        self.engine
            .with(|engine, now| engine.force_reveal(RevealTarget::Node(element), now))
            .unwrap_or(false)
    }

    pub fn statistics(&self) -> RevealStatistics {
        self.engine.read(|engine| engine.statistics())
    }

    pub fn teardown(&mut self) {
        self.engine.with(|engine, _| engine.teardown());
        self.engine.cancel();
        // the observer callback holds the slot; emptying it breaks the cycle
        self.slot.borrow_mut().take();
        if let Some(style) = self.document.get_element_by_id(STYLE_ELEMENT_ID) {
            style.remove();
        }
    }
}

pub fn install(config: &RevealConfig) -> SiteResult<Option<RevealHandle>> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(SiteError::NoWindow)?;

    let slot: EngineSlot = Rc::new(RefCell::new(None));
    let callback = {
        let slot = slot.clone();
        Closure::<dyn FnMut(Array, IntersectionObserver)>::new(move |entries: Array, _: IntersectionObserver| {
            let Some(engine) = slot.borrow().clone() else {
                return;
            };
            let entries: Vec<(Element, bool)> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| (entry.target(), entry.is_intersecting()))
                .collect();
            engine.with(|engine, now| engine.handle_intersections(entries, now));
        })
    };

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(config.threshold));
    options.set_root_margin(&config.root_margin());
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;

    inject_styles(&document, config)?;

    let host = DomRevealHost {
        document: document.clone(),
        observer,
        _callback: callback,
    };
    let engine = Scheduled::new(RevealEngine::initialize(config.clone(), host)?);
    *slot.borrow_mut() = Some(engine.clone());

    let stats = engine.read(|engine| engine.statistics());
    info!("scroll reveal observing {} elements", stats.total_observed);

    Ok(Some(RevealHandle {
        engine,
        slot,
        document,
    }))
}

fn inject_styles(document: &Document, config: &RevealConfig) -> SiteResult<()> {
    if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return Ok(());
    }
    let Some(head) = document.head() else {
        return Ok(());
    };
    let style = document.create_element("style")?;
    style.set_id(STYLE_ELEMENT_ID);
    style.set_text_content(Some(&stylesheet(&config.completed_class)));
    head.append_child(&style)?;
    Ok(())
}

fn stylesheet(done: &str) -> String {
    let motion = ".fade-in-up, .fade-in-down, .fade-in-left, .fade-in-right, \
                  .slide-in-left, .slide-in-right, .scale-in, .animate-on-scroll";
    let cards = ".service-card, .office-service, .step, .contact-item, \
                 .about-text, .philosophy-text, .benefits-preview, .feature-item";
    let with_done = |group: &str| {
        group
            .split(", ")
            .map(|s| format!("{}.{}", s.trim(), done))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{motion} {{ opacity: 0; transition: all 0.8s cubic-bezier(0.25, 0.46, 0.45, 0.94); will-change: opacity, transform; }}
.fade-in-up {{ transform: translateY(30px); }}
.fade-in-down {{ transform: translateY(-30px); }}
.fade-in-left {{ transform: translateX(-30px); }}
.fade-in-right {{ transform: translateX(30px); }}
.slide-in-left {{ transform: translateX(-60px); }}
.slide-in-right {{ transform: translateX(60px); }}
.scale-in {{ transform: scale(0.8); }}
{motion_done} {{ opacity: 1; transform: translateY(0) translateX(0) scale(1); }}
{cards} {{ opacity: 0; transform: translateY(20px); transition: all 0.6s ease-out; }}
{cards_done} {{ opacity: 1; transform: translateY(0); }}
@media (prefers-reduced-motion: reduce) {{
  {motion}, {cards} {{ transition: opacity 0.3s ease; transform: none !important; }}
}}",
        motion = motion,
        cards = cards,
        motion_done = with_done(motion),
        cards_done = with_done(cards),
    )
}
