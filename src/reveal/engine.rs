use std::fmt;
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::config::ConfigError;
use crate::reveal::delay::RevealDelay;
use crate::timeline::Timeline;

/// Marker classes picked up when the page does not configure its own list.
pub const DEFAULT_SELECTORS: [&str; 16] = [
    ".fade-in-up",
    ".fade-in-down",
    ".fade-in-left",
    ".fade-in-right",
    ".slide-in-left",
    ".slide-in-right",
    ".scale-in",
    ".animate-on-scroll",
    ".service-card",
    ".about-text",
    ".philosophy-text",
    ".benefits-preview",
    ".feature-item",
    ".office-service",
    ".step",
    ".contact-item",
];

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RevealConfig {
    /// Fraction of the element that must be visible before it counts as intersecting.
    pub threshold: f64,
    /// How far above the bottom edge of the viewport (px) elements start revealing.
    pub root_margin_bottom: u32,
    pub selectors: Vec<String>,
    pub completed_class: String,
    pub visible_class: String,
    pub debug: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin_bottom: 50,
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            completed_class: "animated-in".to_string(),
            visible_class: "is-visible".to_string(),
            debug: false,
        }
    }
}

impl RevealConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        if self.selectors.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::NoSelectors);
        }
        if self.completed_class.trim().is_empty() {
            return Err(ConfigError::EmptyClass("completed_class"));
        }
        if self.visible_class.trim().is_empty() {
            return Err(ConfigError::EmptyClass("visible_class"));
        }
        Ok(())
    }

    pub fn root_margin(&self) -> String {
        format!("0px 0px -{}px 0px", self.root_margin_bottom)
    }

    /// Selector list joined for a single `querySelectorAll` call.
    pub fn selector_group(&self) -> String {
        self.selectors
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Pending,
    Completed,
}

impl RevealState {
    /// Value written to the element's `data-scroll-animation` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            RevealState::Pending => "pending",
            RevealState::Completed => "completed",
        }
    }
}

/// The page as the reveal engine sees it.
///
/// `select_all` and `select_within` return matches in document order without
/// duplicates, the way `querySelectorAll` with a selector group does.
pub trait RevealHost {
    type Node: Clone + PartialEq + fmt::Debug;

    fn select_all(&self, selectors: &str) -> Vec<Self::Node>;
    fn select_within(&self, parent: &Self::Node, selectors: &str) -> Vec<Self::Node>;
    fn select_first(&self, selector: &str) -> Option<Self::Node>;
    fn delay_attribute(&self, node: &Self::Node) -> Option<String>;
    /// Tracking slot stored on the node by `set_slot`, if any.
    fn slot(&self, node: &Self::Node) -> Option<usize>;
    fn set_slot(&mut self, node: &Self::Node, slot: usize);

    fn set_state(&mut self, node: &Self::Node, state: RevealState);
    fn add_class(&mut self, node: &Self::Node, class: &str);
    fn observe(&mut self, node: &Self::Node);
    fn unobserve(&mut self, node: &Self::Node);
    fn disconnect(&mut self);
}

pub enum RevealTarget<'a, N> {
    Node(N),
    Selector(&'a str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealStatistics {
    pub total_observed: usize,
    pub pending: usize,
    pub completed: usize,
}

#[derive(Debug)]
struct Tracked<N> {
    node: N,
    state: RevealState,
    delay: Option<RevealDelay>,
    queued: bool,
}

/// One-shot scroll reveal controller.
///
/// Elements are revealed at most once. A revealed element stops being observed
/// and cascades the reveal to its matching descendants with a stagger.
pub struct RevealEngine<H: RevealHost> {
    config: RevealConfig,
    selector_group: String,
    host: H,
    tracked: Vec<Tracked<H::Node>>,
    timeline: Timeline<usize>,
    torn_down: bool,
}

impl<H: RevealHost> RevealEngine<H> {
    pub fn initialize(config: RevealConfig, host: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let selector_group = config.selector_group();
        let mut engine = Self {
            config,
            selector_group,
            host,
            tracked: Vec::new(),
            timeline: Timeline::new(),
            torn_down: false,
        };
        let found = engine.scan();
        engine.trace(format_args!("observing {} elements", found));
        Ok(engine)
    }

    /// Starts observing matching elements added since the last scan.
    /// Returns how many were newly registered.
    pub fn refresh(&mut self) -> usize {
        if self.torn_down {
            return 0;
        }
        let found = self.scan();
        self.trace(format_args!("refresh registered {} new elements", found));
        found
    }

    pub fn handle_intersections<I>(&mut self, entries: I, now: Duration)
    where
        I: IntoIterator<Item = (H::Node, bool)>,
    {
        if self.torn_down {
            return;
        }
        for (node, intersecting) in entries {
            if !intersecting {
                continue;
            }
            if let Some(idx) = self.position(&node) {
                self.begin(idx, None, now);
            }
        }
        self.tick(now);
    }

    /// Reveals one element regardless of where it is on the page.
    /// Returns false when the element is missing or already revealed.
    pub fn force_reveal(&mut self, target: RevealTarget<'_, H::Node>, now: Duration) -> bool {
        if self.torn_down {
            return false;
        }
        let node = match target {
            RevealTarget::Node(node) => Some(node),
            RevealTarget::Selector(selector) => self.host.select_first(selector),
        };
        let Some(node) = node else {
            return false;
        };

        let idx = match self.position(&node) {
            Some(idx) => idx,
            None => self.register(node),
        };
        if self.tracked[idx].state == RevealState::Completed {
            return false;
        }
        self.begin(idx, None, now);
        self.tick(now);
        true
    }

    pub fn tick(&mut self, now: Duration) {
        if self.torn_down {
            return;
        }
        while let Some((due, idx)) = self.timeline.pop_due(now) {
            self.complete(idx, due);
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        if self.torn_down {
            None
        } else {
            self.timeline.next_deadline()
        }
    }

    pub fn statistics(&self) -> RevealStatistics {
        let completed = self
            .tracked
            .iter()
            .filter(|t| t.state == RevealState::Completed)
            .count();
        RevealStatistics {
            total_observed: self.tracked.len(),
            pending: self.tracked.len() - completed,
            completed,
        }
    }

    pub fn state_of(&self, node: &H::Node) -> Option<RevealState> {
        self.position(node).map(|idx| self.tracked[idx].state)
    }

    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.host.disconnect();
        self.timeline.clear();
        for t in &mut self.tracked {
            t.queued = false;
        }
        self.torn_down = true;
        self.trace(format_args!("torn down"));
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn scan(&mut self) -> usize {
        let mut found = 0;
        for node in self.host.select_all(&self.selector_group) {
            if self.position(&node).is_none() {
                self.register(node);
                found += 1;
            }
        }
        found
    }

    fn register(&mut self, node: H::Node) -> usize {
        let delay = self
            .host
            .delay_attribute(&node)
            .and_then(|raw| match raw.parse::<RevealDelay>() {
                Ok(delay) => Some(delay),
                Err(e) => {
                    warn!("ignoring data-delay on {:?}: {}", node, e);
                    None
                }
            });
        let slot = self.tracked.len();
        self.host.set_slot(&node, slot);
        self.host.set_state(&node, RevealState::Pending);
        self.host.observe(&node);
        self.trace(format_args!("registered {:?}", node));
        self.tracked.push(Tracked {
            node,
            state: RevealState::Pending,
            delay,
            queued: false,
        });
        self.tracked.len() - 1
    }

    fn begin(&mut self, idx: usize, cascade_index: Option<usize>, base: Duration) {
        let tracked = &mut self.tracked[idx];
        if tracked.state == RevealState::Completed || tracked.queued {
            return;
        }
        let delay = tracked.delay.unwrap_or_else(|| match cascade_index {
            Some(i) => RevealDelay::cascade(i),
            None => RevealDelay::ZERO,
        });
        tracked.queued = true;
        self.timeline.schedule(base + delay.as_duration(), idx);
        if self.config.debug {
            debug!("[reveal] {:?} scheduled after {}", self.tracked[idx].node, delay);
        }
    }

    fn complete(&mut self, idx: usize, at: Duration) {
        let tracked = &mut self.tracked[idx];
        tracked.queued = false;
        if tracked.state == RevealState::Completed {
            return;
        }
        tracked.state = RevealState::Completed;
        let node = tracked.node.clone();

        self.host.add_class(&node, &self.config.completed_class);
        self.host.add_class(&node, &self.config.visible_class);
        self.host.set_state(&node, RevealState::Completed);
        self.host.unobserve(&node);
        self.trace(format_args!("completed {:?}", node));

        let children = self.host.select_within(&node, &self.selector_group);
        for (i, child) in children.into_iter().enumerate() {
            let child_idx = match self.position(&child) {
                Some(child_idx) => child_idx,
                None => self.register(child),
            };
            self.begin(child_idx, Some(i), at);
        }
    }

    /// A slot copied onto another node (e.g. by `cloneNode`) fails the identity check.
    fn position(&self, node: &H::Node) -> Option<usize> {
        self.host
            .slot(node)
            .filter(|&slot| self.tracked.get(slot).is_some_and(|t| &t.node == node))
    }

    fn trace(&self, message: fmt::Arguments<'_>) {
        if self.config.debug {
            debug!("[reveal] {}", message);
        }
    }
}
