use std::time::Duration;

/// Deadline-ordered queue of timed steps.
///
/// Controllers never sleep. They push steps with an absolute deadline and the
/// host calls back with the current time once `next_deadline()` has passed.
/// Steps sharing a deadline come out in the order they were scheduled.
#[derive(Debug)]
pub struct Timeline<T> {
    entries: Vec<Entry<T>>,
}

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    step: T,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, step: T) {
        // after every entry due no later, so ties stay first-in first-out
        let at = self.entries.partition_point(|e| e.due <= due);
        self.entries.insert(at, Entry { due, step });
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.first().map(|e| e.due)
    }

    /// Removes and returns the earliest step whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, T)> {
        match self.entries.first() {
            Some(e) if e.due <= now => {
                let e = self.entries.remove(0);
                Some((e.due, e.step))
            }
            _ => None,
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.entries.retain(|e| keep(&e.step));
    }

    pub fn any(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.entries.iter().any(|e| pred(&e.step))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn pops_in_deadline_order() {
        let mut t = Timeline::new();
        t.schedule(ms(300), "c");
        t.schedule(ms(100), "a");
        t.schedule(ms(200), "b");

        assert_eq!(t.next_deadline(), Some(ms(100)));
        assert_eq!(t.pop_due(ms(50)), None);
        assert_eq!(t.pop_due(ms(250)), Some((ms(100), "a")));
        assert_eq!(t.pop_due(ms(250)), Some((ms(200), "b")));
        assert_eq!(t.pop_due(ms(250)), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn equal_deadlines_keep_insertion_order() {
        let mut t = Timeline::new();
        t.schedule(ms(10), 1);
        t.schedule(ms(10), 2);
        t.schedule(ms(5), 0);
        t.schedule(ms(10), 3);
        t.schedule(ms(20), 4);

        assert_eq!(t.pop_due(ms(10)), Some((ms(5), 0)));
        assert_eq!(t.pop_due(ms(10)), Some((ms(10), 1)));
        assert_eq!(t.pop_due(ms(10)), Some((ms(10), 2)));
        assert_eq!(t.pop_due(ms(10)), Some((ms(10), 3)));
        assert_eq!(t.pop_due(ms(10)), None);
        assert_eq!(t.next_deadline(), Some(ms(20)));
    }

    #[test]
    fn retain_and_clear() {
        let mut t = Timeline::new();
        t.schedule(ms(1), 1);
        t.schedule(ms(2), 2);
        t.retain(|s| *s != 1);
        assert_eq!(t.next_deadline(), Some(ms(2)));
        assert!(t.any(|s| *s == 2));
        t.clear();
        assert!(t.is_empty());
    }
}
