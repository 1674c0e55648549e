use std::time::Duration;

/// Wheel ticks closer together than this collapse into one navigation request.
pub const WHEEL_DEBOUNCE: Duration = Duration::from_millis(50);

/// Minimum vertical travel (px) for a touch gesture to count as a swipe.
pub const MIN_SWIPE_DISTANCE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Previous,
    First,
    Last,
    GoTo(usize),
}

/// Maps a `KeyboardEvent.key` value to a navigation command.
pub fn command_for_key(key: &str) -> Option<NavCommand> {
    match key {
        "ArrowDown" | "PageDown" | " " | "Spacebar" => Some(NavCommand::Next),
        "ArrowUp" | "PageUp" => Some(NavCommand::Previous),
        "Home" => Some(NavCommand::First),
        "End" => Some(NavCommand::Last),
        _ => None,
    }
}

/// Scroll direction of a wheel delta; zero deltas carry no intent.
pub fn command_for_wheel(delta_y: f64) -> Option<NavCommand> {
    if delta_y > 0.0 {
        Some(NavCommand::Next)
    } else if delta_y < 0.0 {
        Some(NavCommand::Previous)
    } else {
        None
    }
}

/// Tracks one vertical touch gesture from `touchstart` to `touchend`.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    start_y: Option<f64>,
    min_distance: f64,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(MIN_SWIPE_DISTANCE)
    }
}

impl SwipeTracker {
    pub fn new(min_distance: f64) -> Self {
        Self {
            start_y: None,
            min_distance,
        }
    }

    pub fn start(&mut self, client_y: f64) {
        self.start_y = Some(client_y);
    }

    pub fn reset(&mut self) {
        self.start_y = None;
    }

    /// Ends the gesture. Swiping up (finger moves towards the top) advances.
    pub fn finish(&mut self, client_y: f64) -> Option<NavCommand> {
        let start = self.start_y.take()?;
        let delta = start - client_y;
        if delta.abs() <= self.min_distance {
            return None;
        }
        if delta > 0.0 {
            Some(NavCommand::Next)
        } else {
            Some(NavCommand::Previous)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_mapping() {
        assert_eq!(command_for_key("ArrowDown"), Some(NavCommand::Next));
        assert_eq!(command_for_key("PageDown"), Some(NavCommand::Next));
        assert_eq!(command_for_key(" "), Some(NavCommand::Next));
        assert_eq!(command_for_key("ArrowUp"), Some(NavCommand::Previous));
        assert_eq!(command_for_key("PageUp"), Some(NavCommand::Previous));
        assert_eq!(command_for_key("Home"), Some(NavCommand::First));
        assert_eq!(command_for_key("End"), Some(NavCommand::Last));
        assert_eq!(command_for_key("Enter"), None);
        assert_eq!(command_for_key("ArrowLeft"), None);
    }

    #[test]
    fn wheel_direction() {
        assert_eq!(command_for_wheel(120.0), Some(NavCommand::Next));
        assert_eq!(command_for_wheel(-3.0), Some(NavCommand::Previous));
        assert_eq!(command_for_wheel(0.0), None);
    }

    #[test]
    fn swipe_threshold() {
        let mut swipe = SwipeTracker::default();
        swipe.start(400.0);
        assert_eq!(swipe.finish(340.0), Some(NavCommand::Next));

        swipe.start(300.0);
        assert_eq!(swipe.finish(380.0), Some(NavCommand::Previous));

        swipe.start(300.0);
        assert_eq!(swipe.finish(250.0), None, "exactly the minimum is not enough");

        assert_eq!(swipe.finish(0.0), None, "no gesture in progress");
    }
}
