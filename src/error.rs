use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::config::ConfigError;
use crate::slides::navigator::SlideError;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed page configuration: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error(transparent)]
    Slides(#[from] SlideError),

    #[error("no browser window available")]
    NoWindow,

    #[error("DOM call failed: {0}")]
    Dom(String),
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        SiteError::Dom(message)
    }
}

pub type SiteResult<T> = Result<T, SiteError>;
