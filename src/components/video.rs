use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::config::ConfigError;
use crate::timeline::Timeline;

/// The play/pause button fades out after this long without pointer movement.
pub const CONTROLS_IDLE: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    pub button_selector: String,
    pub desktop_selector: String,
    pub mobile_selector: String,
    /// Viewport width (px) from which the desktop video is the one on screen.
    pub desktop_min_width: f64,
    pub play_label: String,
    pub pause_label: String,
    pub playing_announcement: String,
    pub paused_announcement: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            button_selector: ".video-control-btn".to_string(),
            desktop_selector: "#hero-video-desktop".to_string(),
            mobile_selector: "#hero-video-mobile".to_string(),
            desktop_min_width: 768.0,
            play_label: "Play video".to_string(),
            pause_label: "Pause video".to_string(),
            playing_announcement: "Video playing".to_string(),
            paused_announcement: "Video paused".to_string(),
        }
    }
}

impl VideoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.desktop_min_width.is_finite() && self.desktop_min_width >= 0.0) {
            return Err(ConfigError::Negative("video.desktop_min_width"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSource {
    Desktop,
    Mobile,
}

pub fn active_source(viewport_width: f64, desktop_min_width: f64) -> VideoSource {
    if viewport_width >= desktop_min_width {
        VideoSource::Desktop
    } else {
        VideoSource::Mobile
    }
}

pub trait VideoSurface {
    fn viewport_width(&self) -> f64;
    /// `None` when the page has no video for `source`.
    fn is_paused(&self, source: VideoSource) -> Option<bool>;
    fn play(&mut self, source: VideoSource);
    fn pause(&mut self, source: VideoSource);
    fn set_button_state(&mut self, playing: bool, label: &str);
    fn set_controls_visible(&mut self, visible: bool);
    fn announce(&mut self, message: &str);
}

#[derive(Debug)]
enum VideoStep {
    HideControls,
}

/// Play/pause control for the hero video, with a button that hides while the
/// video plays undisturbed.
pub struct VideoControl<S: VideoSurface> {
    config: VideoConfig,
    surface: S,
    timeline: Timeline<VideoStep>,
}

impl<S: VideoSurface> VideoControl<S> {
    pub fn new(config: VideoConfig, surface: S) -> Self {
        Self {
            config,
            surface,
            timeline: Timeline::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn active(&self) -> VideoSource {
        active_source(self.surface.viewport_width(), self.config.desktop_min_width)
    }

    fn active_playing(&self) -> bool {
        self.surface.is_paused(self.active()) == Some(false)
    }

    /// The button was pressed: flips the on-screen video.
    pub fn toggle(&mut self) {
        let source = self.active();
        match self.surface.is_paused(source) {
            Some(true) => {
                self.surface.play(source);
                self.surface.announce(&self.config.playing_announcement);
            }
            Some(false) => {
                self.surface.pause(source);
                self.surface.announce(&self.config.paused_announcement);
            }
            None => debug!("no {:?} video to toggle", source),
        }
    }

    pub fn on_play(&mut self, now: Duration) {
        self.surface.set_button_state(true, &self.config.pause_label);
        self.schedule_hide(now);
    }

    pub fn on_pause(&mut self) {
        self.timeline.clear();
        self.surface.set_button_state(false, &self.config.play_label);
        self.surface.set_controls_visible(true);
    }

    pub fn on_pointer_move(&mut self, now: Duration) {
        self.surface.set_controls_visible(true);
        self.timeline.clear();
        if self.active_playing() {
            self.schedule_hide(now);
        }
    }

    fn schedule_hide(&mut self, now: Duration) {
        self.timeline.clear();
        self.timeline.schedule(now + CONTROLS_IDLE, VideoStep::HideControls);
    }

    pub fn tick(&mut self, now: Duration) {
        while let Some((_, step)) = self.timeline.pop_due(now) {
            match step {
                VideoStep::HideControls => {
                    if self.active_playing() {
                        self.surface.set_controls_visible(false);
                    }
                }
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct FakeVideo {
        width: f64,
        desktop: Option<bool>,
        mobile: Option<bool>,
        playing_class: bool,
        label: String,
        controls_visible: bool,
        announcements: Vec<String>,
    }

    impl FakeVideo {
        fn slot(&mut self, source: VideoSource) -> &mut Option<bool> {
            match source {
                VideoSource::Desktop => &mut self.desktop,
                VideoSource::Mobile => &mut self.mobile,
            }
        }
    }

    impl VideoSurface for FakeVideo {
        fn viewport_width(&self) -> f64 {
            self.width
        }
        fn is_paused(&self, source: VideoSource) -> Option<bool> {
            match source {
                VideoSource::Desktop => self.desktop,
                VideoSource::Mobile => self.mobile,
            }
        }
        fn play(&mut self, source: VideoSource) {
            if let Some(paused) = self.slot(source) {
                *paused = false;
            }
        }
        fn pause(&mut self, source: VideoSource) {
            if let Some(paused) = self.slot(source) {
                *paused = true;
            }
        }
        fn set_button_state(&mut self, playing: bool, label: &str) {
            self.playing_class = playing;
            self.label = label.to_string();
        }
        fn set_controls_visible(&mut self, visible: bool) {
            self.controls_visible = visible;
        }
        fn announce(&mut self, message: &str) {
            self.announcements.push(message.to_string());
        }
    }

    fn control(width: f64) -> VideoControl<FakeVideo> {
        VideoControl::new(
            VideoConfig::default(),
            FakeVideo {
                width,
                desktop: Some(true),
                mobile: Some(true),
                playing_class: false,
                label: String::new(),
                controls_visible: true,
                announcements: Vec::new(),
            },
        )
    }

    #[test]
    fn breakpoint_picks_the_video_on_screen() {
        assert_eq!(active_source(1024.0, 768.0), VideoSource::Desktop);
        assert_eq!(active_source(768.0, 768.0), VideoSource::Desktop);
        assert_eq!(active_source(767.0, 768.0), VideoSource::Mobile);
    }

    #[test]
    fn toggle_plays_then_pauses_the_active_video() {
        let mut v = control(400.0);
        v.toggle();
        assert_eq!(v.surface().mobile, Some(false));
        assert_eq!(v.surface().desktop, Some(true));
        v.toggle();
        assert_eq!(v.surface().mobile, Some(true));
        assert_eq!(v.surface().announcements, vec!["Video playing", "Video paused"]);
    }

    #[test]
    fn controls_hide_while_playing_and_return_on_pointer_move() {
        let mut v = control(1280.0);
        v.toggle();
        v.on_play(ms(0));
        assert!(v.surface().playing_class);
        assert_eq!(v.surface().label, "Pause video");

        v.tick(ms(2999));
        assert!(v.surface().controls_visible);
        v.tick(ms(3000));
        assert!(!v.surface().controls_visible);

        v.on_pointer_move(ms(5000));
        assert!(v.surface().controls_visible);
        assert_eq!(v.next_deadline(), Some(ms(8000)));
    }

    #[test]
    fn pausing_keeps_controls_up() {
        let mut v = control(1280.0);
        v.toggle();
        v.on_play(ms(0));
        v.toggle();
        v.on_pause();
        assert!(!v.surface().playing_class);
        assert_eq!(v.surface().label, "Play video");
        assert_eq!(v.next_deadline(), None);

        v.on_pointer_move(ms(100));
        assert_eq!(v.next_deadline(), None);
        v.tick(ms(10_000));
        assert!(v.surface().controls_visible);
    }

    #[test]
    fn missing_video_is_left_alone() {
        let mut v = control(400.0);
        v.surface.mobile = None;
        v.toggle();
        assert!(v.surface().announcements.is_empty());
    }
}
