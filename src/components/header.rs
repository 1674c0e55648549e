use serde::Deserialize;

use crate::config::ConfigError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeaderConfig {
    pub selector: String,
    pub scrolled_class: String,
    /// Scroll offset (px) past which the header gets the scrolled styling.
    pub scrolled_after: f64,
    /// Scroll offset (px) past which scrolling down hides the header.
    pub hide_after: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            selector: ".site-header".to_string(),
            scrolled_class: "scrolled".to_string(),
            scrolled_after: 50.0,
            hide_after: 100.0,
        }
    }
}

impl HeaderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scrolled_after.is_finite() && self.scrolled_after >= 0.0) {
            return Err(ConfigError::Negative("header.scrolled_after"));
        }
        if !(self.hide_after.is_finite() && self.hide_after >= 0.0) {
            return Err(ConfigError::Negative("header.hide_after"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderState {
    pub scrolled: bool,
    pub hidden: bool,
}

impl HeaderState {
    pub fn transform(self) -> &'static str {
        if self.hidden {
            "translateY(-100%)"
        } else {
            "translateY(0)"
        }
    }
}

/// Hides the header while scrolling down and brings it back on any upward scroll.
#[derive(Debug, Clone)]
pub struct HeaderTracker {
    last_y: f64,
    scrolled_after: f64,
    hide_after: f64,
}

impl HeaderTracker {
    pub fn new(config: &HeaderConfig, initial_y: f64) -> Self {
        Self {
            last_y: initial_y,
            scrolled_after: config.scrolled_after,
            hide_after: config.hide_after,
        }
    }

    pub fn update(&mut self, y: f64) -> HeaderState {
        let state = HeaderState {
            scrolled: y > self.scrolled_after,
            hidden: y > self.last_y && y > self.hide_after,
        };
        self.last_y = y;
        state
    }
}
