use log::info;
use web_sys::Element;
use yew::prelude::*;

use site_behaviors::config::{self, SiteConfig};
use site_behaviors::SiteBehaviors;

const ROOT_ID: &str = "site-behaviors-root";

#[function_component(App)]
fn app() -> Html {
    let config = use_memo(|_| SiteConfig::from_document(), ());

    html! {
        <SiteBehaviors {config} />
    }
}

/// The component renders nothing visible, so a hidden mount point is created when the page has none.
fn mount_point() -> Option<Element> {
    let document = web_sys::window()?.document()?;
    if let Some(root) = document.get_element_by_id(ROOT_ID) {
        return Some(root);
    }
    let root = document.create_element("div").ok()?;
    root.set_id(ROOT_ID);
    let _ = root.set_attribute("hidden", "");
    document.body()?.append_child(&root).ok()?;
    Some(root)
}

fn main() {
    console_error_panic_hook::set_once();

    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting site behaviors");
    match mount_point() {
        Some(root) => {
            yew::Renderer::<App>::with_root(root).render();
        }
        None => log::error!("no document to mount into"),
    }
}
