use serde::Deserialize;

use crate::config::ConfigError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParallaxConfig {
    pub selector: String,
    /// Used when an element has no usable `data-speed`.
    pub default_speed: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            selector: ".parallax-bg".to_string(),
            default_speed: 0.5,
        }
    }
}

impl ParallaxConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_speed.is_finite() {
            return Err(ConfigError::NotFinite("parallax.default_speed"));
        }
        Ok(())
    }
}

pub fn parse_speed(raw: Option<&str>, default: f64) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|s| s.is_finite())
        .unwrap_or(default)
}

/// Backgrounds move up at `speed` times the scroll distance.
pub fn offset(scroll_top: f64, speed: f64) -> f64 {
    let offset = -(scroll_top * speed);
    if offset == 0.0 {
        0.0 // no "-0px"
    } else {
        offset
    }
}

pub fn transform(offset: f64) -> String {
    format!("translateY({}px)", offset)
}
