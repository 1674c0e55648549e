use gloo_events::EventListener;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlMediaElement, Window};

use crate::components::video::{VideoConfig, VideoControl, VideoSource, VideoSurface};
use crate::dom::announce::announce;
use crate::dom::listener::{cancelable, prevent};
use crate::dom::scheduler::Scheduled;
use crate::error::{SiteError, SiteResult};

pub struct DomVideo {
    window: Window,
    document: Document,
    button: HtmlElement,
    desktop: Option<HtmlMediaElement>,
    mobile: Option<HtmlMediaElement>,
}

impl DomVideo {
    fn video(&self, source: VideoSource) -> Option<&HtmlMediaElement> {
        match source {
            VideoSource::Desktop => self.desktop.as_ref(),
            VideoSource::Mobile => self.mobile.as_ref(),
        }
    }
}

impl VideoSurface for DomVideo {
    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
    }

    fn is_paused(&self, source: VideoSource) -> Option<bool> {
        self.video(source).map(|video| video.paused())
    }

    fn play(&mut self, source: VideoSource) {
        if let Some(video) = self.video(source) {
            // autoplay policy may reject the promise; the button simply stays in play state
            let _ = video.play();
        }
    }

    fn pause(&mut self, source: VideoSource) {
        if let Some(video) = self.video(source) {
            let _ = video.pause();
        }
    }

    fn set_button_state(&mut self, playing: bool, label: &str) {
        let _ = self.button.class_list().toggle_with_force("playing", playing);
        let _ = self.button.set_attribute("aria-label", label);
    }

    fn set_controls_visible(&mut self, visible: bool) {
        let opacity = if visible { "0.8" } else { "0" };
        let _ = self.button.style().set_property("opacity", opacity);
    }

    fn announce(&mut self, message: &str) {
        announce(&self.document, message);
    }
}

fn media(document: &Document, selector: &str) -> SiteResult<Option<HtmlMediaElement>> {
    Ok(document
        .query_selector(selector)?
        .and_then(|el| el.dyn_into::<HtmlMediaElement>().ok()))
}

pub struct VideoHandle {
    video: Scheduled<VideoControl<DomVideo>>,
    listeners: Vec<EventListener>,
}

impl VideoHandle {
    pub fn teardown(&mut self) {
        self.listeners.clear();
        self.video.cancel();
    }
}

pub fn install(config: &VideoConfig) -> SiteResult<Option<VideoHandle>> {
    let window = web_sys::window().ok_or(SiteError::NoWindow)?;
    let document = window.document().ok_or(SiteError::NoWindow)?;

    let Some(button) = document
        .query_selector(&config.button_selector)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        debug!("no video control on this page");
        return Ok(None);
    };
    let desktop = media(&document, &config.desktop_selector)?;
    let mobile = media(&document, &config.mobile_selector)?;
    let videos: Vec<HtmlMediaElement> = desktop.iter().chain(mobile.iter()).cloned().collect();
    if videos.is_empty() {
        debug!("video control without a video");
        return Ok(None);
    }

    let surface = DomVideo {
        window,
        document: document.clone(),
        button: button.clone(),
        desktop,
        mobile,
    };
    let video = Scheduled::new(VideoControl::new(config.clone(), surface));
    let mut listeners = Vec::new();

    {
        let video = video.clone();
        listeners.push(cancelable(&button, "click", move |event| {
            prevent(event);
            video.with(|video, _| video.toggle());
        }));
    }

    for element in &videos {
        {
            let video = video.clone();
            listeners.push(EventListener::new(element, "play", move |_| {
                video.with(|video, now| video.on_play(now));
            }));
        }
        {
            let video = video.clone();
            listeners.push(EventListener::new(element, "pause", move |_| {
                video.with(|video, _| video.on_pause());
            }));
        }
    }

    {
        let video = video.clone();
        listeners.push(EventListener::new(&document, "mousemove", move |_| {
            video.with(|video, now| video.on_pointer_move(now));
        }));
    }

    Ok(Some(VideoHandle { video, listeners }))
}
