use std::time::Duration;

use serde::Deserialize;

use crate::config::ConfigError;

/// Focus moves to an anchor target this long after the smooth scroll starts.
pub const FOCUS_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    pub anchor_selector: String,
    /// Space (px) left above an anchor target for the fixed header.
    pub anchor_offset: f64,
    pub to_top_enabled: bool,
    /// Scroll offset (px) past which the back-to-top button shows.
    pub to_top_after: f64,
    pub to_top_label: String,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            anchor_selector: "a[href^=\"#\"]".to_string(),
            anchor_offset: 100.0,
            to_top_enabled: true,
            to_top_after: 300.0,
            to_top_label: "Back to top".to_string(),
        }
    }
}

impl ScrollConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.anchor_offset.is_finite() && self.anchor_offset >= 0.0) {
            return Err(ConfigError::Negative("scroll.anchor_offset"));
        }
        if !(self.to_top_after.is_finite() && self.to_top_after >= 0.0) {
            return Err(ConfigError::Negative("scroll.to_top_after"));
        }
        Ok(())
    }
}

/// Selector for the element an in-page link points at.
/// A bare `#` means "top of page" and is left to the browser.
pub fn anchor_target(href: &str) -> Option<&str> {
    let href = href.trim();
    match href.strip_prefix('#') {
        Some(id) if !id.is_empty() => Some(href),
        _ => None,
    }
}

pub fn scroll_destination(element_top: f64, offset: f64) -> f64 {
    (element_top - offset).max(0.0)
}

pub fn to_top_visible(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}
