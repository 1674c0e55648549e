use gloo_timers::callback::Timeout;
use web_sys::Document;

use crate::components::menu::ANNOUNCEMENT_LIFETIME;

/// Reads `message` to screen readers through a short-lived polite live region.
pub fn announce(document: &Document, message: &str) {
    let Some(body) = document.body() else {
        return;
    };
    let Ok(region) = document.create_element("div") else {
        return;
    };
    let _ = region.set_attribute("aria-live", "polite");
    let _ = region.set_attribute("aria-atomic", "true");
    region.set_class_name("sr-only");
    region.set_text_content(Some(message));
    if body.append_child(&region).is_ok() {
        Timeout::new(ANNOUNCEMENT_LIFETIME.as_millis() as u32, move || region.remove()).forget();
    }
}
