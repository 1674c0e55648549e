use gloo_events::EventListener;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, Node};

use crate::components::menu::{arrow_target, MenuConfig, MenuEvent, MenuSurface, MobileMenu};
use crate::dom::announce::announce;
use crate::dom::listener::{cancelable, prevent};
use crate::dom::reveal::element_list;
use crate::dom::scheduler::Scheduled;
use crate::error::{SiteError, SiteResult};

const FOCUSABLE: &str = "a[href], button, textarea, input[type=\"text\"], \
                         input[type=\"radio\"], input[type=\"checkbox\"], select";

fn focusables(root: &Element, selector: &str) -> Vec<HtmlElement> {
    root.query_selector_all(selector)
        .map(element_list)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn focused_index(document: &Document, items: &[HtmlElement]) -> Option<usize> {
    let active = document.active_element()?;
    items.iter().position(|item| {
        let item: &Element = item;
        *item == active
    })
}

pub struct DomMenu {
    document: Document,
    toggle: Element,
    menu: HtmlElement,
    scroll_lock_class: String,
}

impl MenuSurface for DomMenu {
    fn set_menu_hidden(&mut self, hidden: bool) {
        self.menu.set_hidden(hidden);
    }

    fn set_menu_open(&mut self, open: bool) {
        let _ = self.menu.class_list().toggle_with_force("open", open);
    }

    fn set_toggle_state(&mut self, expanded: bool, label: &str) {
        let _ = self
            .toggle
            .set_attribute("aria-expanded", if expanded { "true" } else { "false" });
        let _ = self.toggle.set_attribute("aria-label", label);
    }

    fn lock_scroll(&mut self, locked: bool) {
        if let Some(body) = self.document.body() {
            let _ = body
                .class_list()
                .toggle_with_force(&self.scroll_lock_class, locked);
        }
    }

    fn focus_first(&mut self) {
        if let Some(first) = focusables(&self.menu, FOCUSABLE).first() {
            let _ = first.focus();
        }
    }

    fn announce(&mut self, message: &str) {
        announce(&self.document, message);
    }
}

pub struct MenuHandle {
    menu: Scheduled<MobileMenu<DomMenu>>,
    listeners: Vec<EventListener>,
}

impl MenuHandle {
    pub fn is_open(&self) -> bool {
        self.menu.read(|menu| menu.is_open())
    }

    pub fn teardown(&mut self) {
        self.listeners.clear();
        self.menu.cancel();
    }
}

pub fn install(config: &MenuConfig) -> SiteResult<Option<MenuHandle>> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(SiteError::NoWindow)?;

    let toggle = document.query_selector(&config.toggle_selector)?;
    let menu_el = document
        .query_selector(&config.menu_selector)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let (Some(toggle), Some(menu_el)) = (toggle, menu_el) else {
        debug!("no mobile menu on this page");
        return Ok(None);
    };

    let surface = DomMenu {
        document: document.clone(),
        toggle: toggle.clone(),
        menu: menu_el.clone(),
        scroll_lock_class: config.scroll_lock_class.clone(),
    };
    let menu = Scheduled::new(MobileMenu::new(config.clone(), surface));
    let mut listeners = Vec::new();

    {
        let menu = menu.clone();
        listeners.push(cancelable(&toggle, "click", move |event| {
            prevent(event);
            menu.with(|menu, now| menu.handle(MenuEvent::ToggleClicked, now));
        }));
    }

    for link in element_list(document.query_selector_all(&config.link_selector)?) {
        let menu = menu.clone();
        listeners.push(EventListener::new(&link, "click", move |_| {
            menu.with(|menu, now| menu.handle(MenuEvent::LinkClicked, now));
        }));
    }

    {
        let menu = menu.clone();
        let document_for_keys = document.clone();
        let menu_root: Element = menu_el.clone().into();
        listeners.push(cancelable(&document, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            match key.key().as_str() {
                "Escape" => {
                    menu.with(|menu, now| menu.handle(MenuEvent::EscapePressed, now));
                }
                "Tab" => {
                    let items = focusables(&menu_root, FOCUSABLE);
                    let focused = focused_index(&document_for_keys, &items);
                    let target = menu.read(|menu| menu.on_tab(focused, items.len(), key.shift_key()));
                    if let Some(item) = target.and_then(|i| items.get(i)) {
                        let _ = item.focus();
                        prevent(event);
                    }
                }
                _ => {}
            }
        }));
    }

    {
        let menu = menu.clone();
        let toggle_node: Node = toggle.clone().into();
        let menu_node: Node = menu_el.clone().into();
        listeners.push(EventListener::new(&document, "click", move |event| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            let inside = toggle_node.contains(target.as_ref()) || menu_node.contains(target.as_ref());
            if !inside && menu.read(|menu| menu.is_open()) {
                menu.with(|menu, now| menu.handle(MenuEvent::ClickedOutside, now));
            }
        }));
    }

    for nav in element_list(document.query_selector_all(&config.arrow_nav_selector)?) {
        let document = document.clone();
        let root = nav.clone();
        listeners.push(cancelable(&nav, "keydown", move |event| {
            let Some(down) = event.dyn_ref::<KeyboardEvent>().and_then(|k| match k.key().as_str() {
                "ArrowDown" => Some(true),
                "ArrowUp" => Some(false),
                _ => None,
            }) else {
                return;
            };
            let links = focusables(&root, "a");
            let focused = focused_index(&document, &links);
            if let Some(link) = arrow_target(focused, links.len(), down).and_then(|i| links.get(i)) {
                prevent(event);
                let _ = link.focus();
            }
        }));
    }

    Ok(Some(MenuHandle { menu, listeners }))
}
