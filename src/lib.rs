pub mod behaviors;
pub mod config;
pub mod error;
pub mod timeline;

pub mod reveal {
    pub mod delay;
    pub mod engine;
}

pub mod slides {
    pub mod input;
    pub mod navigator;
}

pub mod components {
    pub mod contact_form;
    pub mod header;
    pub mod keyboard;
    pub mod menu;
    pub mod parallax;
    pub mod scroll;
    pub mod video;
}

pub mod dom {
    pub mod announce;
    pub mod contact_form;
    pub mod header;
    pub mod keyboard;
    pub mod listener;
    pub mod menu;
    pub mod parallax;
    pub mod reveal;
    pub mod scheduler;
    pub mod scroll;
    pub mod slides;
    pub mod video;
}

pub use behaviors::{Site, SiteBehaviors};
pub use config::SiteConfig;
pub use error::{SiteError, SiteResult};
