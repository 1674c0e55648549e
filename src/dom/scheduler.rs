use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use log::warn;

use crate::components::contact_form::{ContactForm, FormSurface};
use crate::components::menu::{MenuSurface, MobileMenu};
use crate::components::video::{VideoControl, VideoSurface};
use crate::reveal::engine::{RevealEngine, RevealHost};
use crate::slides::navigator::{SlideNavigator, SlideSurface};

/// Milliseconds since the epoch as a `Duration`; every controller shares this clock.
pub fn now() -> Duration {
    Duration::from_secs_f64(web_sys::js_sys::Date::now() / 1000.0)
}

/// Longest wait handed to `setTimeout`, which treats its delay as a signed 32-bit
/// count. Anything larger wraps negative and fires immediately.
pub const MAX_WAIT_MS: u32 = i32::MAX as u32;

/// Milliseconds from `now` until `deadline`, clamped to what a browser timer accepts.
/// A deadline beyond the ceiling is reached by re-arming after an early wake-up.
pub fn wait_millis(deadline: Duration, now: Duration) -> u32 {
    deadline
        .saturating_sub(now)
        .as_millis()
        .min(MAX_WAIT_MS as u128) as u32
}

/// A controller driven by deadlines rather than its own timers.
pub trait Tickable {
    fn tick(&mut self, now: Duration);
    fn next_deadline(&self) -> Option<Duration>;
}

impl<H: RevealHost> Tickable for RevealEngine<H> {
    fn tick(&mut self, now: Duration) {
        RevealEngine::tick(self, now)
    }
    fn next_deadline(&self) -> Option<Duration> {
        RevealEngine::next_deadline(self)
    }
}

impl<S: SlideSurface> Tickable for SlideNavigator<S> {
    fn tick(&mut self, now: Duration) {
        SlideNavigator::tick(self, now)
    }
    fn next_deadline(&self) -> Option<Duration> {
        SlideNavigator::next_deadline(self)
    }
}

impl<S: MenuSurface> Tickable for MobileMenu<S> {
    fn tick(&mut self, now: Duration) {
        MobileMenu::tick(self, now)
    }
    fn next_deadline(&self) -> Option<Duration> {
        MobileMenu::next_deadline(self)
    }
}

impl<S: FormSurface> Tickable for ContactForm<S> {
    fn tick(&mut self, now: Duration) {
        ContactForm::tick(self, now)
    }
    fn next_deadline(&self) -> Option<Duration> {
        ContactForm::next_deadline(self)
    }
}

impl<S: VideoSurface> Tickable for VideoControl<S> {
    fn tick(&mut self, now: Duration) {
        VideoControl::tick(self, now)
    }
    fn next_deadline(&self) -> Option<Duration> {
        VideoControl::next_deadline(self)
    }
}

/// Shared handle to a controller plus the one timeout armed for its next deadline.
pub struct Scheduled<T> {
    inner: Rc<RefCell<T>>,
    timer: Rc<RefCell<Option<Timeout>>>,
}

impl<T> Clone for Scheduled<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            timer: self.timer.clone(),
        }
    }
}

impl<T: Tickable + 'static> Scheduled<T> {
    pub fn new(inner: T) -> Self {
        let scheduled = Self {
            inner: Rc::new(RefCell::new(inner)),
            timer: Rc::new(RefCell::new(None)),
        };
        scheduled.rearm();
        scheduled
    }

    /// Runs `f` against the controller, then re-arms the timer.
    /// Returns `None` if the controller is already borrowed higher up the stack.
    pub fn with<R>(&self, f: impl FnOnce(&mut T, Duration) -> R) -> Option<R> {
        let result = match self.inner.try_borrow_mut() {
            Ok(mut inner) => f(&mut inner, now()),
            Err(_) => {
                warn!("controller busy, dropping event");
                return None;
            }
        };
        self.rearm();
        Some(result)
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub fn cancel(&self) {
        self.timer.borrow_mut().take();
    }

    fn rearm(&self) {
        arm(self.inner.clone(), self.timer.clone());
    }
}

fn arm<T: Tickable + 'static>(inner: Rc<RefCell<T>>, timer: Rc<RefCell<Option<Timeout>>>) {
    let deadline = inner.borrow().next_deadline();
    let Some(deadline) = deadline else {
        // dropping a pending timeout cancels it
        timer.borrow_mut().take();
        return;
    };

    let wait = wait_millis(deadline, now());
    let slot = timer.clone();
    let timeout = Timeout::new(wait, move || {
        // this timeout already fired; release it without clearing the running closure
        if let Some(fired) = slot.borrow_mut().take() {
            let _ = fired.forget();
        }
        if let Ok(mut controller) = inner.try_borrow_mut() {
            controller.tick(now());
        }
        arm(inner, slot);
    });
    *timer.borrow_mut() = Some(timeout);
}
