use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_render::{request_animation_frame, AnimationFrame};
use web_sys::{Event, EventTarget};

/// Listener whose handler may call `prevent_default`.
///
/// `EventListener::new` registers passive listeners, which browsers forbid from
/// cancelling the event.
pub fn cancelable<F>(target: &EventTarget, event: &'static str, handler: F) -> EventListener
where
    F: FnMut(&Event) + 'static,
{
    EventListener::new_with_options(target, event, EventListenerOptions::enable_prevent_default(), handler)
}

pub fn prevent(event: &Event) {
    if event.cancelable() {
        event.prevent_default();
    }
}

/// Coalesces bursts of events into one callback per animation frame.
pub struct FrameThrottle {
    queued: Rc<Cell<bool>>,
    frame: RefCell<Option<AnimationFrame>>,
    on_frame: Rc<RefCell<dyn FnMut()>>,
}

impl FrameThrottle {
    pub fn new(on_frame: impl FnMut() + 'static) -> Self {
        Self {
            queued: Rc::new(Cell::new(false)),
            frame: RefCell::new(None),
            on_frame: Rc::new(RefCell::new(on_frame)),
        }
    }

    pub fn request(&self) {
        if self.queued.replace(true) {
            return;
        }
        let queued = self.queued.clone();
        let on_frame = self.on_frame.clone();
        let frame = request_animation_frame(move |_| {
            queued.set(false);
            (on_frame.borrow_mut())();
        });
        // the frame being replaced has already run
        *self.frame.borrow_mut() = Some(frame);
    }
}
