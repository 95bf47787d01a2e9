//! Trailing-edge debouncing driven by the event loop's clock.
//!
//! The debouncer never spawns timers of its own. Callers pass the current
//! [`Instant`] to [`Debouncer::trigger`] and [`Debouncer::poll`], which keeps
//! every decision on the UI thread and makes the behaviour reproducible in
//! tests.

use std::time::{Duration, Instant};

use crate::domain::ConfigError;

/// Collapses bursts of triggers into a single payload.
///
/// Each call to [`trigger`](Debouncer::trigger) replaces whatever payload was
/// still pending and restarts the quiet window. Once the window elapses,
/// [`poll`](Debouncer::poll) hands back the last payload exactly once.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use custview::application::Debouncer;
///
/// let mut debouncer = Debouncer::new(Duration::from_millis(1000));
/// let start = Instant::now();
///
/// debouncer.trigger("ann", start);
/// debouncer.trigger("anna", start + Duration::from_millis(300));
///
/// assert_eq!(debouncer.poll(start + Duration::from_millis(1200)), None);
/// assert_eq!(debouncer.poll(start + Duration::from_millis(1300)), Some("anna"));
/// assert_eq!(debouncer.poll(start + Duration::from_millis(5000)), None);
/// ```
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Builds a debouncer from a signed millisecond count, rejecting negatives.
    pub fn from_millis(delay_ms: i64) -> Result<Self, ConfigError> {
        let millis = u64::try_from(delay_ms).map_err(|_| ConfigError::NegativeDebounce(delay_ms))?;
        Ok(Self::new(Duration::from_millis(millis)))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `payload`, superseding any payload that has not fired yet.
    pub fn trigger(&mut self, payload: T, now: Instant) {
        self.pending = Some(Pending {
            payload,
            deadline: now + self.delay,
        });
    }

    /// Returns the pending payload if its quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline);
        if !due {
            return None;
        }
        self.pending.take().map(|pending| pending.payload)
    }

    /// Drops the pending payload without firing it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left until the pending payload fires, if any.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(now))
    }
}
