use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Stagger applied per descendant when a parent reveal cascades.
pub const CASCADE_STAGGER: Duration = Duration::from_millis(100);

/// Largest delay a browser timer can wait for (`setTimeout` takes a signed 32-bit count).
pub const MAX_DELAY_MS: u64 = i32::MAX as u64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DelayError {
    #[error("delay {0:?} does not start with a number")]
    NotANumber(String),
    #[error("delay {0:?} is negative")]
    Negative(String),
    #[error("delay {0:?} is out of range")]
    Overflow(String),
}

/// Reveal delay read from an element's `data-delay` attribute.
///
/// Accepts a leading run of digits in milliseconds, so `"150"` and `"150ms"`
/// both mean 150 ms. Anything else is rejected instead of silently becoming zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RevealDelay(Duration);

impl RevealDelay {
    pub const ZERO: RevealDelay = RevealDelay(Duration::ZERO);

    pub fn from_millis(ms: u64) -> Self {
        RevealDelay(Duration::from_millis(ms))
    }

    /// Default delay of the `index`-th matched descendant of a revealed parent.
    pub fn cascade(index: usize) -> Self {
        RevealDelay(CASCADE_STAGGER * index as u32)
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl FromStr for RevealDelay {
    type Err = DelayError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if unsigned.starts_with('-') {
            return Err(DelayError::Negative(raw.to_string()));
        }

        let digits_end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        let digits = &unsigned[..digits_end];
        if digits.is_empty() {
            return Err(DelayError::NotANumber(raw.to_string()));
        }

        match digits.parse::<u64>() {
            Ok(ms) if ms <= MAX_DELAY_MS => Ok(RevealDelay::from_millis(ms)),
            _ => Err(DelayError::Overflow(raw.to_string())),
        }
    }
}

impl fmt::Display for RevealDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}
