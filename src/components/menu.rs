use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::timeline::Timeline;

/// The menu stays in the layout this long after closing so the exit animation can run.
pub const HIDE_DELAY: Duration = Duration::from_millis(300);
/// How long a screen-reader announcement stays in the document.
pub const ANNOUNCEMENT_LIFETIME: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MenuConfig {
    pub toggle_selector: String,
    pub menu_selector: String,
    pub link_selector: String,
    /// Menus whose links get ArrowUp/ArrowDown focus movement.
    pub arrow_nav_selector: String,
    pub open_label: String,
    pub close_label: String,
    pub opened_announcement: String,
    pub closed_announcement: String,
    pub scroll_lock_class: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            toggle_selector: ".mobile-menu-toggle".to_string(),
            menu_selector: ".mobile-navigation".to_string(),
            link_selector: ".mobile-menu a".to_string(),
            arrow_nav_selector: ".nav-menu, .mobile-menu".to_string(),
            open_label: "Open menu".to_string(),
            close_label: "Close menu".to_string(),
            opened_announcement: "Menu opened".to_string(),
            closed_announcement: "Menu closed".to_string(),
            scroll_lock_class: "no-scroll".to_string(),
        }
    }
}

pub trait MenuSurface {
    fn set_menu_hidden(&mut self, hidden: bool);
    fn set_menu_open(&mut self, open: bool);
    fn set_toggle_state(&mut self, expanded: bool, label: &str);
    fn lock_scroll(&mut self, locked: bool);
    fn focus_first(&mut self);
    fn announce(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    ToggleClicked,
    LinkClicked,
    EscapePressed,
    ClickedOutside,
}

#[derive(Debug)]
enum MenuStep {
    Hide,
}

pub struct MobileMenu<S: MenuSurface> {
    config: MenuConfig,
    surface: S,
    open: bool,
    timeline: Timeline<MenuStep>,
}

impl<S: MenuSurface> MobileMenu<S> {
    pub fn new(config: MenuConfig, surface: S) -> Self {
        Self {
            config,
            surface,
            open: false,
            timeline: Timeline::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn handle(&mut self, event: MenuEvent, now: Duration) {
        match event {
            MenuEvent::ToggleClicked if self.open => self.close(now),
            MenuEvent::ToggleClicked => self.open(),
            MenuEvent::LinkClicked | MenuEvent::EscapePressed | MenuEvent::ClickedOutside => {
                self.close(now)
            }
        }
    }

    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        // a pending hide from a quick close/reopen must not fire
        self.timeline.clear();

        self.surface.set_menu_hidden(false);
        self.surface.set_menu_open(true);
        self.surface.set_toggle_state(true, &self.config.close_label);
        self.surface.lock_scroll(true);
        self.surface.focus_first();
        self.surface.announce(&self.config.opened_announcement);
        debug!("mobile menu opened");
    }

    pub fn close(&mut self, now: Duration) {
        if !self.open {
            return;
        }
        self.open = false;

        self.surface.set_menu_open(false);
        self.surface.set_toggle_state(false, &self.config.open_label);
        self.surface.lock_scroll(false);
        self.timeline.schedule(now + HIDE_DELAY, MenuStep::Hide);
        self.surface.announce(&self.config.closed_announcement);
        debug!("mobile menu closed");
    }

    /// Focus target for a Tab press while the menu is open, or `None` to let
    /// the browser move focus itself.
    pub fn on_tab(&self, focused: Option<usize>, focusable: usize, shift: bool) -> Option<usize> {
        if !self.open {
            return None;
        }
        trap_tab(focused, focusable, shift)
    }

    pub fn tick(&mut self, now: Duration) {
        while let Some((_, step)) = self.timeline.pop_due(now) {
            match step {
                MenuStep::Hide => {
                    if !self.open {
                        self.surface.set_menu_hidden(true);
                    }
                }
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline.next_deadline()
    }
}

/// Wraps Tab at the ends of the focusable list.
pub fn trap_tab(focused: Option<usize>, len: usize, shift: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let last = len - 1;
    match (focused, shift) {
        (Some(0), true) => Some(last),
        (Some(i), false) if i == last => Some(0),
        _ => None,
    }
}

/// Cyclic ArrowDown/ArrowUp movement through a menu's links.
pub fn arrow_target(focused: Option<usize>, len: usize, down: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let next = if down {
        focused.map_or(0, |i| (i + 1) % len)
    } else {
        match focused {
            Some(i) if i > 0 => i - 1,
            _ => len - 1,
        }
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[derive(Default)]
    struct FakeMenu {
        hidden: bool,
        open_class: bool,
        expanded: bool,
        label: String,
        scroll_locked: bool,
        focused_first: usize,
        announcements: Vec<String>,
    }

    impl MenuSurface for FakeMenu {
        fn set_menu_hidden(&mut self, hidden: bool) {
            self.hidden = hidden;
        }
        fn set_menu_open(&mut self, open: bool) {
            self.open_class = open;
        }
        fn set_toggle_state(&mut self, expanded: bool, label: &str) {
            self.expanded = expanded;
            self.label = label.to_string();
        }
        fn lock_scroll(&mut self, locked: bool) {
            self.scroll_locked = locked;
        }
        fn focus_first(&mut self) {
            self.focused_first += 1;
        }
        fn announce(&mut self, message: &str) {
            self.announcements.push(message.to_string());
        }
    }

    fn menu() -> MobileMenu<FakeMenu> {
        MobileMenu::new(
            MenuConfig::default(),
            FakeMenu {
                hidden: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn toggle_opens_and_closes() {
        let mut m = menu();
        m.handle(MenuEvent::ToggleClicked, ms(0));
        let s = m.surface();
        assert!(m.is_open());
        assert!(!s.hidden && s.open_class && s.expanded && s.scroll_locked);
        assert_eq!(s.label, "Close menu");
        assert_eq!(s.focused_first, 1);

        m.handle(MenuEvent::ToggleClicked, ms(100));
        let s = m.surface();
        assert!(!m.is_open());
        assert!(!s.open_class && !s.expanded && !s.scroll_locked);
        assert_eq!(s.label, "Open menu");
        assert!(!s.hidden, "stays in layout during the exit animation");

        m.tick(ms(399));
        assert!(!m.surface().hidden);
        m.tick(ms(400));
        assert!(m.surface().hidden);
        assert_eq!(m.surface().announcements, vec!["Menu opened", "Menu closed"]);
    }

    #[test]
    fn reopen_cancels_pending_hide() {
        let mut m = menu();
        m.open();
        m.close(ms(0));
        m.open();
        m.tick(ms(1000));
        assert!(!m.surface().hidden);
        assert_eq!(m.next_deadline(), None);
    }

    #[test]
    fn escape_link_and_outside_clicks_close_only_when_open() {
        let mut m = menu();
        m.handle(MenuEvent::EscapePressed, ms(0));
        m.handle(MenuEvent::ClickedOutside, ms(0));
        assert!(m.surface().announcements.is_empty());

        for event in [MenuEvent::EscapePressed, MenuEvent::LinkClicked, MenuEvent::ClickedOutside] {
            m.open();
            m.handle(event, ms(0));
            assert!(!m.is_open(), "{:?}", event);
        }
    }

    #[test]
    fn focus_trap_wraps_only_while_open() {
        let mut m = menu();
        assert_eq!(m.on_tab(Some(3), 4, false), None);
        m.open();
        assert_eq!(m.on_tab(Some(3), 4, false), Some(0));
        assert_eq!(m.on_tab(Some(0), 4, true), Some(3));
        assert_eq!(m.on_tab(Some(1), 4, false), None);
        assert_eq!(m.on_tab(None, 4, true), None);
        assert_eq!(m.on_tab(Some(0), 0, true), None);
    }

    #[test]
    fn arrow_keys_cycle() {
        assert_eq!(arrow_target(None, 3, true), Some(0));
        assert_eq!(arrow_target(Some(2), 3, true), Some(0));
        assert_eq!(arrow_target(Some(0), 3, false), Some(2));
        assert_eq!(arrow_target(None, 3, false), Some(2));
        assert_eq!(arrow_target(Some(1), 3, false), Some(0));
        assert_eq!(arrow_target(None, 0, true), None);
    }
}
