use log::{warn, Level};
use serde::Deserialize;
use thiserror::Error;

use crate::components::contact_form::FormConfig;
use crate::components::header::HeaderConfig;
use crate::components::keyboard::KeyboardConfig;
use crate::components::menu::MenuConfig;
use crate::components::parallax::ParallaxConfig;
use crate::components::scroll::ScrollConfig;
use crate::components::video::VideoConfig;
use crate::error::SiteResult;
use crate::reveal::engine::RevealConfig;
use crate::slides::navigator::SlideConfig;

/// Id of the optional `<script type="application/json">` block holding page overrides.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // local builds
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("threshold must be within 0.0..=1.0, got {0}")]
    Threshold(f64),
    #[error("at least one reveal selector is required")]
    NoSelectors,
    #[error("{0} must not be empty")]
    EmptyClass(&'static str),
    #[error("{0} must be a finite, non-negative number")]
    Negative(&'static str),
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub reveal: RevealConfig,
    pub slides: SlideConfig,
    pub menu: MenuConfig,
    pub header: HeaderConfig,
    pub parallax: ParallaxConfig,
    pub form: FormConfig,
    pub scroll: ScrollConfig,
    pub keyboard: KeyboardConfig,
    pub video: VideoConfig,
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> SiteResult<Self> {
        let config: SiteConfig = serde_json::from_str(raw)?;
        config.reveal.validate()?;
        config.header.validate()?;
        config.parallax.validate()?;
        config.scroll.validate()?;
        config.video.validate()?;
        Ok(config)
    }

    /// Reads the page's configuration block, falling back to defaults when it is
    /// absent or unusable.
    pub fn from_document() -> Self {
        let raw = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        match raw {
            Some(raw) if !raw.trim().is_empty() => Self::from_json(&raw).unwrap_or_else(|e| {
                warn!("Ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiteError;

    #[test]
    fn empty_object_gives_defaults() {
        let config = SiteConfig::from_json("{}").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.reveal.threshold, 0.1);
        assert_eq!(config.reveal.root_margin_bottom, 50);
        assert_eq!(config.reveal.completed_class, "animated-in");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let raw = r#"{
            "reveal": { "threshold": 0.25, "selectors": [".card"], "debug": true },
            "form": { "busy_label": "Wird gesendet..." }
        }"#;
        let config = SiteConfig::from_json(raw).unwrap();
        assert_eq!(config.reveal.threshold, 0.25);
        assert_eq!(config.reveal.selectors, vec![".card".to_string()]);
        assert!(config.reveal.debug);
        assert_eq!(config.reveal.visible_class, "is-visible");
        assert_eq!(config.form.busy_label, "Wird gesendet...");
        assert_eq!(config.slides, SlideConfig::default());
    }

    #[test]
    fn page_chrome_overrides() {
        let raw = r#"{
            "scroll": { "anchor_offset": 80, "to_top_enabled": false },
            "video": { "play_label": "Video abspielen", "pause_label": "Video pausieren" }
        }"#;
        let config = SiteConfig::from_json(raw).unwrap();
        assert_eq!(config.scroll.anchor_offset, 80.0);
        assert!(!config.scroll.to_top_enabled);
        assert_eq!(config.scroll.to_top_after, 300.0);
        assert_eq!(config.video.pause_label, "Video pausieren");
        assert_eq!(config.video.desktop_min_width, 768.0);
        assert_eq!(config.keyboard.keyboard_class, "keyboard-navigation");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SiteConfig::from_json(r#"{"reveal": {"threshold": 1.5}}"#).unwrap_err();
        assert!(matches!(err, SiteError::Config(ConfigError::Threshold(_))));

        let err = SiteConfig::from_json(r#"{"reveal": {"selectors": []}}"#).unwrap_err();
        assert!(matches!(err, SiteError::Config(ConfigError::NoSelectors)));

        let err = SiteConfig::from_json(r#"{"scroll": {"anchor_offset": -10}}"#).unwrap_err();
        assert!(matches!(err, SiteError::Config(ConfigError::Negative("scroll.anchor_offset"))));

        let err = SiteConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, SiteError::ConfigJson(_)));
    }
}
