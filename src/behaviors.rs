use std::rc::Rc;

use log::{debug, error, info};
use yew::prelude::*;

use crate::config::SiteConfig;
use crate::dom::contact_form::{self, ContactForms};
use crate::dom::header::{self, HeaderHandle};
use crate::dom::keyboard::{self, KeyboardHandle};
use crate::dom::menu::{self, MenuHandle};
use crate::dom::parallax::{self, ParallaxHandle};
use crate::dom::reveal::{self, RevealHandle};
use crate::dom::scroll::{self, AnchorHandle, ToTopHandle};
use crate::dom::slides::{self, SlidesHandle};
use crate::dom::video::{self, VideoHandle};
use crate::error::SiteResult;

/// Runs one behavior's installer; a failure is logged and the page carries on without it.
fn isolate<T>(name: &str, install: impl FnOnce() -> SiteResult<Option<T>>) -> Option<T> {
    match install() {
        Ok(Some(handle)) => {
            info!("{} ready", name);
            Some(handle)
        }
        Ok(None) => {
            debug!("{} not present", name);
            None
        }
        Err(e) => {
            error!("{} failed to start: {}", name, e);
            None
        }
    }
}

/// Everything installed on the current page.
pub struct Site {
    reveal: Option<RevealHandle>,
    slides: Option<SlidesHandle>,
    menu: Option<MenuHandle>,
    header: Option<HeaderHandle>,
    parallax: Option<ParallaxHandle>,
    forms: Option<ContactForms>,
    anchors: Option<AnchorHandle>,
    to_top: Option<ToTopHandle>,
    keyboard: Option<KeyboardHandle>,
    video: Option<VideoHandle>,
}

impl Site {
    pub fn install(config: &SiteConfig) -> Self {
        Self {
            reveal: isolate("scroll reveal", || reveal::install(&config.reveal)),
            slides: isolate("slide navigator", || slides::install(&config.slides)),
            menu: isolate("mobile menu", || menu::install(&config.menu)),
            header: isolate("header", || header::install(&config.header)),
            parallax: isolate("parallax", || parallax::install(&config.parallax)),
            forms: isolate("contact forms", || contact_form::install(&config.form)),
            anchors: isolate("anchor scrolling", || scroll::install_anchors(&config.scroll)),
            to_top: isolate("back-to-top button", || scroll::install_to_top(&config.scroll)),
            keyboard: isolate("keyboard navigation", || keyboard::install(&config.keyboard)),
            video: isolate("video controls", || video::install(&config.video)),
        }
    }

    pub fn reveal(&self) -> Option<&RevealHandle> {
        self.reveal.as_ref()
    }

    pub fn slides(&self) -> Option<&SlidesHandle> {
        self.slides.as_ref()
    }

    pub fn teardown(&mut self) {
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.teardown();
        }
        if let Some(slides) = self.slides.as_mut() {
            slides.teardown();
        }
        if let Some(menu) = self.menu.as_mut() {
            menu.teardown();
        }
        if let Some(forms) = self.forms.as_mut() {
            forms.teardown();
        }
        if let Some(anchors) = self.anchors.as_mut() {
            anchors.teardown();
        }
        if let Some(to_top) = self.to_top.as_mut() {
            to_top.teardown();
        }
        if let Some(video) = self.video.as_mut() {
            video.teardown();
        }
        self.header = None;
        self.parallax = None;
        self.keyboard = None;
        info!("site behaviors torn down");
    }
}

#[derive(Properties, PartialEq)]
pub struct SiteBehaviorsProps {
    pub config: Rc<SiteConfig>,
}

/// Attaches the page behaviors once mounted and detaches them on unmount.
#[function_component(SiteBehaviors)]
pub fn site_behaviors(props: &SiteBehaviorsProps) -> Html {
    {
        let config = props.config.clone();
        use_effect_with_deps(
            move |config: &Rc<SiteConfig>| {
                let mut site = Site::install(config);
                move || site.teardown()
            },
            config,
        );
    }

    html! {}
}
