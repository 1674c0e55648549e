use std::time::Duration;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::slides::input::{command_for_key, command_for_wheel, NavCommand, SwipeTracker, WHEEL_DEBOUNCE};
use crate::timeline::Timeline;

/// Time between assigning the incoming/outgoing roles and activating the target,
/// so the browser paints the start position before the animated class lands.
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);
/// Input stays locked this long after a transition starts.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(800);
/// When the new slide's content animation begins, measured from the transition start.
pub const CONTENT_DELAY: Duration = Duration::from_millis(400);
/// Pause after the content animation begins before the first item appears.
pub const CONTENT_LEAD: Duration = Duration::from_millis(300);
pub const CONTENT_STAGGER: Duration = Duration::from_millis(100);

/// Every class a slide role may put on a slide element.
pub const ROLE_CLASSES: [&str; 3] = ["active", "prev", "next"];

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlideConfig {
    pub slide_selector: String,
    pub dot_selector: String,
    pub previous_selector: String,
    pub next_selector: String,
    pub progress_selector: String,
    pub loader_selector: String,
    pub content_selector: String,
    pub cta_selector: String,
    pub cta_target: CtaTarget,
}

/// Where the call-to-action button leads.
///
/// In page config: `"last"`, `{"slide": 2}` or `"disabled"`.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CtaTarget {
    /// The closing slide, which holds the contact form.
    #[default]
    Last,
    Slide(usize),
    Disabled,
}

impl CtaTarget {
    pub fn resolve(self, len: usize) -> Option<usize> {
        match self {
            CtaTarget::Last => len.checked_sub(1),
            CtaTarget::Slide(index) if index < len => Some(index),
            CtaTarget::Slide(_) | CtaTarget::Disabled => None,
        }
    }
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            slide_selector: ".slide".to_string(),
            dot_selector: ".nav-dot".to_string(),
            previous_selector: ".nav-prev".to_string(),
            next_selector: ".nav-next".to_string(),
            progress_selector: ".progress-bar".to_string(),
            loader_selector: ".loader".to_string(),
            content_selector: ".slide-title, .slide-subtitle, .slide-text, .feature-item, \
                               .apartment-card, .infra-item, .contact-item"
                .to_string(),
            cta_selector: ".cta-button".to_string(),
            cta_target: CtaTarget::Last,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlideError {
    #[error("slide navigator needs at least one slide")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideRole {
    Active,
    Incoming(Direction),
    Outgoing(Direction),
    Inert,
}

impl SlideRole {
    /// Forward motion pushes the outgoing slide up (`prev`) and brings the
    /// incoming one in from below (`next`); backward is the mirror image.
    pub fn class_name(self) -> Option<&'static str> {
        match self {
            SlideRole::Active => Some("active"),
            SlideRole::Outgoing(Direction::Forward) | SlideRole::Incoming(Direction::Backward) => Some("prev"),
            SlideRole::Incoming(Direction::Forward) | SlideRole::Outgoing(Direction::Backward) => Some("next"),
            SlideRole::Inert => None,
        }
    }
}

/// What the navigator drives: slide elements plus the indicators around them.
pub trait SlideSurface {
    fn apply_role(&mut self, index: usize, role: SlideRole);
    fn apply_background(&mut self, index: usize, background: &str);
    fn mark_indicator(&mut self, current: usize);
    fn set_controls(&mut self, previous_disabled: bool, next_disabled: bool);
    fn set_progress(&mut self, fraction: f64);
    fn content_len(&self, index: usize) -> usize;
    fn hide_content(&mut self, index: usize);
    fn show_content_item(&mut self, index: usize, item: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
    pub started_at: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Transitioning(Transition),
}

#[derive(Debug)]
struct Slide {
    role: SlideRole,
    background: Option<String>,
}

#[derive(Debug)]
enum Step {
    Settle { slide: usize, started_at: Duration },
    Unlock,
    ContentItem { slide: usize, item: usize },
    Wheel(NavCommand),
}

pub struct SlideNavigator<S: SlideSurface> {
    surface: S,
    slides: Vec<Slide>,
    current: usize,
    phase: Phase,
    timeline: Timeline<Step>,
    swipe: SwipeTracker,
}

impl<S: SlideSurface> SlideNavigator<S> {
    /// Builds a navigator over slides in document order; slide 0 starts active.
    pub fn new(backgrounds: Vec<Option<String>>, mut surface: S) -> Result<Self, SlideError> {
        if backgrounds.is_empty() {
            return Err(SlideError::Empty);
        }

        let slides: Vec<Slide> = backgrounds
            .into_iter()
            .enumerate()
            .map(|(i, background)| Slide {
                role: if i == 0 { SlideRole::Active } else { SlideRole::Inert },
                background,
            })
            .collect();

        for (i, slide) in slides.iter().enumerate() {
            if let Some(bg) = &slide.background {
                surface.apply_background(i, bg);
            }
            surface.apply_role(i, slide.role);
        }

        let mut navigator = Self {
            surface,
            slides,
            current: 0,
            phase: Phase::Idle,
            timeline: Timeline::new(),
            swipe: SwipeTracker::default(),
        };
        navigator.sync_indicators();
        debug!("slide navigator ready with {} slides", navigator.len());
        Ok(navigator)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Destination of the running transition, or the settled slide.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning(_))
    }

    pub fn role(&self, index: usize) -> Option<SlideRole> {
        self.slides.get(index).map(|s| s.role)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn go_to(&mut self, index: usize, now: Duration) -> bool {
        if index == self.current || index >= self.slides.len() || self.is_transitioning() {
            return false;
        }

        let from = self.current;
        let direction = if index > from {
            Direction::Forward
        } else {
            Direction::Backward
        };
        debug!("slide {} -> {}", from, index);

        // content entries still queued for the slide we are leaving
        self.timeline
            .retain(|step| !matches!(step, Step::ContentItem { .. }));

        for i in 0..self.slides.len() {
            self.set_role(i, SlideRole::Inert);
        }
        self.set_role(from, SlideRole::Outgoing(direction));
        self.set_role(index, SlideRole::Incoming(direction));

        self.current = index;
        self.sync_indicators();
        if let Some(bg) = &self.slides[index].background {
            self.surface.apply_background(index, bg);
        }

        self.phase = Phase::Transitioning(Transition {
            from,
            to: index,
            direction,
            started_at: now,
        });
        self.timeline.schedule(
            now + SETTLE_DELAY,
            Step::Settle {
                slide: index,
                started_at: now,
            },
        );
        self.timeline.schedule(now + TRANSITION_DURATION, Step::Unlock);
        true
    }

    /// Follows the call-to-action button. Returns whether a transition started.
    pub fn follow_cta(&mut self, target: CtaTarget, now: Duration) -> bool {
        match target.resolve(self.slides.len()) {
            Some(index) => self.go_to(index, now),
            None => false,
        }
    }

    pub fn next(&mut self, now: Duration) -> bool {
        if self.current + 1 < self.slides.len() {
            self.go_to(self.current + 1, now)
        } else {
            false
        }
    }

    pub fn previous(&mut self, now: Duration) -> bool {
        if self.current > 0 {
            self.go_to(self.current - 1, now)
        } else {
            false
        }
    }

    pub fn dispatch(&mut self, command: NavCommand, now: Duration) -> bool {
        match command {
            NavCommand::Next => self.next(now),
            NavCommand::Previous => self.previous(now),
            NavCommand::First => self.go_to(0, now),
            NavCommand::Last => self.go_to(self.slides.len() - 1, now),
            NavCommand::GoTo(index) => self.go_to(index, now),
        }
    }

    /// Debounced: only the last wheel tick inside the window navigates.
    pub fn on_wheel(&mut self, delta_y: f64, now: Duration) {
        if self.is_transitioning() {
            return;
        }
        let Some(command) = command_for_wheel(delta_y) else {
            return;
        };
        self.timeline.retain(|step| !matches!(step, Step::Wheel(_)));
        self.timeline.schedule(now + WHEEL_DEBOUNCE, Step::Wheel(command));
    }

    pub fn on_touch_start(&mut self, client_y: f64) {
        self.swipe.start(client_y);
    }

    pub fn on_touch_end(&mut self, client_y: f64, now: Duration) -> bool {
        if self.is_transitioning() {
            self.swipe.reset();
            return false;
        }
        match self.swipe.finish(client_y) {
            Some(command) => self.dispatch(command, now),
            None => false,
        }
    }

    /// Returns whether the key belongs to the navigator, so the caller can
    /// suppress the browser's own scrolling for it.
    pub fn on_key(&mut self, key: &str, now: Duration) -> bool {
        let Some(command) = command_for_key(key) else {
            return false;
        };
        if !self.is_transitioning() {
            self.dispatch(command, now);
        }
        true
    }

    pub fn tick(&mut self, now: Duration) {
        while let Some((due, step)) = self.timeline.pop_due(now) {
            match step {
                Step::Settle { slide, started_at } => self.settle(slide, started_at),
                Step::Unlock => {
                    self.phase = Phase::Idle;
                    debug!("slide transition finished at {}", self.current);
                }
                Step::ContentItem { slide, item } => self.surface.show_content_item(slide, item),
                Step::Wheel(command) => {
                    self.dispatch(command, due);
                }
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline.next_deadline()
    }

    /// Re-applies the progress indicator, e.g. after the viewport changed size.
    pub fn refresh_progress(&mut self) {
        let fraction = (self.current + 1) as f64 / self.slides.len() as f64;
        self.surface.set_progress(fraction);
    }

    fn settle(&mut self, slide: usize, started_at: Duration) {
        for i in 0..self.slides.len() {
            if matches!(self.slides[i].role, SlideRole::Incoming(_) | SlideRole::Outgoing(_)) {
                self.set_role(i, SlideRole::Inert);
            }
        }
        self.set_role(slide, SlideRole::Active);

        // hidden now so nothing flashes before the staggered entry
        self.surface.hide_content(slide);
        let first = started_at + CONTENT_DELAY + CONTENT_LEAD;
        let items = self.surface.content_len(slide);
        for item in 0..items {
            let due = first + CONTENT_STAGGER * item as u32;
            self.timeline.schedule(due, Step::ContentItem { slide, item });
        }
    }

    fn set_role(&mut self, index: usize, role: SlideRole) {
        self.slides[index].role = role;
        self.surface.apply_role(index, role);
    }

    fn sync_indicators(&mut self) {
        let last = self.slides.len() - 1;
        self.surface.mark_indicator(self.current);
        self.surface
            .set_controls(self.current == 0, self.current == last);
        self.refresh_progress();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[derive(Default)]
    struct FakeDeck {
        roles: Vec<SlideRole>,
        backgrounds: Vec<Option<String>>,
        role_writes: usize,
        indicator: Option<usize>,
        controls: (bool, bool),
        progress: f64,
        content: Vec<usize>,
        hidden: Vec<usize>,
        shown: Vec<(usize, usize)>,
    }

    impl FakeDeck {
        fn new(slides: usize) -> Self {
            Self {
                roles: vec![SlideRole::Inert; slides],
                backgrounds: vec![None; slides],
                content: vec![0; slides],
                ..Default::default()
            }
        }

        fn active_count(&self) -> usize {
            self.roles.iter().filter(|r| **r == SlideRole::Active).count()
        }
    }

    impl SlideSurface for FakeDeck {
        fn apply_role(&mut self, index: usize, role: SlideRole) {
            self.roles[index] = role;
            self.role_writes += 1;
        }

        fn apply_background(&mut self, index: usize, background: &str) {
            self.backgrounds[index] = Some(background.to_string());
        }

        fn mark_indicator(&mut self, current: usize) {
            self.indicator = Some(current);
        }

        fn set_controls(&mut self, previous_disabled: bool, next_disabled: bool) {
            self.controls = (previous_disabled, next_disabled);
        }

        fn set_progress(&mut self, fraction: f64) {
            self.progress = fraction;
        }

        fn content_len(&self, index: usize) -> usize {
            self.content[index]
        }

        fn hide_content(&mut self, index: usize) {
            self.hidden.push(index);
        }

        fn show_content_item(&mut self, index: usize, item: usize) {
            self.shown.push((index, item));
        }
    }

    fn deck(slides: usize) -> SlideNavigator<FakeDeck> {
        SlideNavigator::new(vec![None; slides], FakeDeck::new(slides)).unwrap()
    }

    #[test]
    fn starts_on_first_slide() {
        let nav = SlideNavigator::new(
            vec![Some("linear-gradient(red, blue)".into()), None, None],
            FakeDeck::new(3),
        )
        .unwrap();
        let s = nav.surface();
        assert_eq!(nav.current_index(), 0);
        assert_eq!(nav.phase(), Phase::Idle);
        assert_eq!(s.roles, vec![SlideRole::Active, SlideRole::Inert, SlideRole::Inert]);
        assert_eq!(s.backgrounds[0].as_deref(), Some("linear-gradient(red, blue)"));
        assert_eq!(s.indicator, Some(0));
        assert_eq!(s.controls, (true, false));
        assert!((s.progress - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_deck_is_an_error() {
        assert!(matches!(
            SlideNavigator::new(Vec::new(), FakeDeck::new(0)),
            Err(SlideError::Empty)
        ));
    }

    #[test]
    fn previous_at_first_slide_is_noop() {
        let mut nav = deck(4);
        let writes = nav.surface().role_writes;
        assert!(!nav.previous(ms(0)));
        assert_eq!(nav.current_index(), 0);
        assert_eq!(nav.surface().role_writes, writes);
        assert_eq!(nav.next_deadline(), None);
    }

    #[test]
    fn next_at_last_slide_is_noop() {
        let mut nav = deck(3);
        assert!(nav.go_to(2, ms(0)));
        nav.tick(ms(1000));
        let writes = nav.surface().role_writes;
        assert!(!nav.next(ms(2000)));
        assert_eq!(nav.current_index(), 2);
        assert_eq!(nav.surface().role_writes, writes);
    }

    #[test]
    fn same_index_is_noop() {
        let mut nav = deck(3);
        assert!(!nav.go_to(0, ms(0)));
        assert!(!nav.go_to(7, ms(0)));
        assert_eq!(nav.phase(), Phase::Idle);
    }

    #[test]
    fn forward_transition_walkthrough() {
        let mut nav = deck(5);
        nav.surface.backgrounds = vec![None; 5];
        nav.slides[3].background = Some("#123".into());
        nav.surface.content[3] = 2;

        assert!(nav.go_to(3, ms(1000)));
        // cursor and indicators move immediately
        assert_eq!(nav.current_index(), 3);
        assert_eq!(nav.surface().indicator, Some(3));
        assert_eq!(nav.surface().controls, (false, false));
        assert!((nav.surface().progress - 0.8).abs() < 1e-9);
        assert_eq!(nav.surface().backgrounds[3].as_deref(), Some("#123"));
        assert_eq!(nav.role(0), Some(SlideRole::Outgoing(Direction::Forward)));
        assert_eq!(nav.role(3), Some(SlideRole::Incoming(Direction::Forward)));
        assert_eq!(nav.role(0).and_then(SlideRole::class_name), Some("prev"));
        assert_eq!(nav.role(3).and_then(SlideRole::class_name), Some("next"));
        assert_eq!(nav.surface().active_count(), 0);
        assert!(matches!(
            nav.phase(),
            Phase::Transitioning(Transition { from: 0, to: 3, direction: Direction::Forward, .. })
        ));

        nav.tick(ms(1049));
        assert_eq!(nav.role(3), Some(SlideRole::Incoming(Direction::Forward)));
        nav.tick(ms(1050));
        assert_eq!(nav.role(3), Some(SlideRole::Active));
        assert_eq!(nav.role(0), Some(SlideRole::Inert));
        assert_eq!(nav.surface().active_count(), 1);
        assert_eq!(nav.surface().hidden, vec![3]);
        assert!(nav.is_transitioning());

        nav.tick(ms(1699));
        assert!(nav.surface().shown.is_empty());
        nav.tick(ms(1700));
        assert_eq!(nav.surface().shown, vec![(3, 0)]);

        nav.tick(ms(1799));
        assert!(nav.is_transitioning());
        nav.tick(ms(1800));
        assert_eq!(nav.phase(), Phase::Idle);
        assert_eq!(nav.surface().shown, vec![(3, 0), (3, 1)]);
    }

    #[test]
    fn backward_transition_mirrors_classes() {
        let mut nav = deck(3);
        nav.go_to(2, ms(0));
        nav.tick(ms(800));
        assert!(nav.previous(ms(900)));
        assert_eq!(nav.role(2).and_then(SlideRole::class_name), Some("next"));
        assert_eq!(nav.role(1).and_then(SlideRole::class_name), Some("prev"));
        nav.tick(ms(2000));
        assert_eq!(nav.current_index(), 1);
        assert_eq!(nav.surface().roles, vec![SlideRole::Inert, SlideRole::Active, SlideRole::Inert]);
    }

    #[test]
    fn navigation_is_dropped_while_transitioning() {
        let mut nav = deck(5);
        assert!(nav.go_to(3, ms(0)));
        assert!(!nav.go_to(1, ms(60)));
        assert!(!nav.next(ms(100)));
        nav.tick(ms(800));
        assert_eq!(nav.current_index(), 3);
        assert_eq!(nav.surface().active_count(), 1);
        assert_eq!(nav.role(3), Some(SlideRole::Active));
        assert!(nav.go_to(1, ms(801)));
    }

    #[test]
    fn go_to_each_slide_settles_with_one_active() {
        for target in 1..5 {
            let mut nav = deck(5);
            nav.go_to(target, ms(0));
            nav.tick(TRANSITION_DURATION);
            assert_eq!(nav.surface().active_count(), 1);
            assert_eq!(nav.role(target), Some(SlideRole::Active));
            assert_eq!(nav.surface().controls, (target == 0, target == 4));
        }
    }

    #[test]
    fn keyboard_end_then_home() {
        let mut nav = deck(5);
        assert!(nav.on_key("End", ms(0)));
        nav.tick(ms(1000));
        assert_eq!(nav.current_index(), 4);
        assert_eq!(nav.surface().controls, (false, true));

        assert!(nav.on_key("Home", ms(1000)));
        nav.tick(ms(2000));
        assert_eq!(nav.current_index(), 0);
        assert_eq!(nav.surface().controls, (true, false));
        assert_eq!(nav.role(0), Some(SlideRole::Active));

        assert!(!nav.on_key("a", ms(3000)));
    }

    #[test]
    fn keys_are_claimed_but_ignored_mid_transition() {
        let mut nav = deck(3);
        nav.on_key("ArrowDown", ms(0));
        assert!(nav.on_key("ArrowDown", ms(10)));
        nav.tick(ms(1000));
        assert_eq!(nav.current_index(), 1);
    }

    #[test]
    fn wheel_ticks_are_debounced() {
        let mut nav = deck(5);
        nav.on_wheel(40.0, ms(0));
        nav.on_wheel(40.0, ms(20));
        nav.on_wheel(40.0, ms(40));
        nav.tick(ms(89));
        assert_eq!(nav.current_index(), 0);
        nav.tick(ms(90));
        assert_eq!(nav.current_index(), 1);

        // ignored while the transition runs
        nav.on_wheel(40.0, ms(100));
        nav.tick(ms(1000));
        assert_eq!(nav.current_index(), 1);

        nav.on_wheel(-10.0, ms(1000));
        nav.on_wheel(0.0, ms(1010));
        nav.tick(ms(1050));
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn swipe_navigation() {
        let mut nav = deck(3);
        nav.on_touch_start(500.0);
        assert!(!nav.on_touch_end(470.0, ms(0)));
        assert_eq!(nav.current_index(), 0);

        nav.on_touch_start(500.0);
        assert!(nav.on_touch_end(300.0, ms(0)));
        assert_eq!(nav.current_index(), 1);

        nav.on_touch_start(300.0);
        assert!(!nav.on_touch_end(500.0, ms(100)), "locked mid-transition");

        nav.tick(ms(800));
        nav.on_touch_start(300.0);
        assert!(nav.on_touch_end(500.0, ms(900)));
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn direct_selection_dispatch() {
        let mut nav = deck(4);
        assert!(nav.dispatch(NavCommand::GoTo(2), ms(0)));
        nav.tick(ms(800));
        assert!(nav.dispatch(NavCommand::Last, ms(800)));
        nav.tick(ms(1600));
        assert_eq!(nav.current_index(), 3);
        assert!(!nav.dispatch(NavCommand::GoTo(9), ms(2000)));
    }

    #[test]
    fn pending_content_is_dropped_when_leaving_a_slide() {
        let mut nav = deck(3);
        nav.surface.content[1] = 10;
        nav.go_to(1, ms(0));
        nav.tick(ms(800));
        let shown_before = nav.surface().shown.len();
        assert!(shown_before < 10);

        nav.go_to(2, ms(800));
        nav.tick(ms(5000));
        assert!(nav.surface().shown.iter().skip(shown_before).all(|(slide, _)| *slide == 2));
    }

    #[test]
    fn call_to_action_defaults_to_the_closing_slide() {
        assert_eq!(SlideConfig::default().cta_target, CtaTarget::Last);
        assert_eq!(CtaTarget::Last.resolve(5), Some(4));
        assert_eq!(CtaTarget::Slide(2).resolve(5), Some(2));
        assert_eq!(CtaTarget::Slide(7).resolve(5), None);
        assert_eq!(CtaTarget::Disabled.resolve(5), None);

        let mut nav = deck(5);
        assert!(nav.follow_cta(CtaTarget::default(), ms(0)));
        assert_eq!(nav.current_index(), 4);
        nav.tick(ms(800));
        assert!(!nav.follow_cta(CtaTarget::Disabled, ms(900)));
        assert_eq!(nav.current_index(), 4);
    }

    #[test]
    fn cta_target_reads_from_page_config() {
        let config: SlideConfig = serde_json::from_str(r#"{"cta_target": {"slide": 1}}"#).unwrap();
        assert_eq!(config.cta_target, CtaTarget::Slide(1));
        let config: SlideConfig = serde_json::from_str(r#"{"cta_target": "disabled"}"#).unwrap();
        assert_eq!(config.cta_target, CtaTarget::Disabled);
    }
}
