//! Latest-request-wins delayed task.
//!
//! Each [`Debouncer::submit`] replaces whatever was pending and restarts the
//! delay. The scheduler loop asks for the [`Debouncer::deadline`] to size its
//! wait and collects the value with [`Debouncer::take_due`] once it has passed.
//! Generation tokens let a caller tell whether its submission is still the live one.

use std::time::{Duration, Instant};

#[derive(Debug)]
struct Pending<T> {
    token: u64,
    due: Instant,
    value: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    /// Queue `value`, superseding any pending value. Returns its token.
    pub fn submit(&mut self, value: T, now: Instant) -> u64 {
        self.generation += 1;
        self.pending = Some(Pending {
            token: self.generation,
            due: now + self.delay,
            value,
        });
        self.generation
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Take the pending value if its delay has elapsed at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.due <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `token` belongs to the submission that is still pending.
    pub fn is_current(&self, token: u64) -> bool {
        self.pending.as_ref().is_some_and(|p| p.token == token)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the delay for future submissions. A pending value keeps its deadline.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_last_submission_fires() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(2000));

        let first = debouncer.submit("Par", start);
        let second = debouncer.submit("Pari", start + Duration::from_millis(300));
        let third = debouncer.submit("Paris", start + Duration::from_millis(600));

        assert!(!debouncer.is_current(first));
        assert!(!debouncer.is_current(second));
        assert!(debouncer.is_current(third));

        // The delay restarts with each submission
        assert_eq!(debouncer.take_due(start + Duration::from_millis(2000)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(2600))
        );
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(2600)),
            Some("Paris")
        );

        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.take_due(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        let token = debouncer.submit(1, start);
        debouncer.cancel();

        assert!(!debouncer.is_current(token));
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.take_due(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_zero_delay_is_due_immediately() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.set_delay(Duration::ZERO);

        debouncer.submit("Oslo", now);
        assert_eq!(debouncer.take_due(now), Some("Oslo"));
    }
}
