//! Bounded exponential backoff for solar time fetches.
//!
//! Only [`PhaseError::Network`] failures are retried. Every other error is
//! returned on the first attempt so a bad location never stalls the loop.
//! Sleeps go through the [`TimeSource`] so simulations and tests never block.
//!
//! The bundled [`SunriseProvider`](crate::geo::SunriseProvider) computes times
//! offline and never reports a network failure, so wrapping it costs a single
//! attempt and no sleeps. The wrapper exists for providers that call out to a
//! remote service.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use crate::common::constants::*;
use crate::error::PhaseError;
use crate::geo::{Location, SolarTimeProvider, SolarTimes};
use crate::time_source::TimeSource;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            multiplier: DEFAULT_RETRY_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (0-based), capped at `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(retry.min(i32::MAX as u32) as i32);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    pub fn run<T>(
        &self,
        clock: &dyn TimeSource,
        mut op: impl FnMut() -> Result<T, PhaseError>,
    ) -> Result<T, PhaseError> {
        let attempts = self.max_attempts.max(1);
        let mut retry = 0;

        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && retry + 1 < attempts => {
                    clock.sleep(self.delay_for(retry));
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Wraps any provider with a [`RetryPolicy`].
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
    clock: Arc<dyn TimeSource>,
}

impl<P: SolarTimeProvider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            inner,
            policy,
            clock,
        }
    }
}

impl<P: SolarTimeProvider> SolarTimeProvider for RetryingProvider<P> {
    fn fetch(&self, location: &Location, date: NaiveDate) -> Result<SolarTimes, PhaseError> {
        self.policy
            .run(self.clock.as_ref(), || self.inner.fetch(location, date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualTimeSource;
    use chrono::Local;
    use std::cell::Cell;

    fn network_error() -> PhaseError {
        PhaseError::Network {
            provider: "solar provider",
            message: "timed out".to_string(),
        }
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            multiplier: 3.0,
        };

        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(300));
        assert_eq!(policy.delay_for(2), Duration::from_millis(900));
        assert_eq!(policy.delay_for(3), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(1000));
    }

    #[test]
    fn test_retries_transient_then_succeeds() {
        let clock = ManualTimeSource::new(Local::now());
        let calls = Cell::new(0);

        let result = RetryPolicy::default().run(&clock, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(network_error())
            } else {
                Ok(42)
            }
        });

        assert_eq!(result, Ok(42));
        assert_eq!(calls.get(), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let clock = ManualTimeSource::new(Local::now());
        let calls = Cell::new(0);

        let result: Result<(), _> = RetryPolicy::default().run(&clock, || {
            calls.set(calls.get() + 1);
            Err(network_error())
        });

        assert_eq!(result, Err(network_error()));
        assert_eq!(calls.get(), DEFAULT_RETRY_ATTEMPTS);
    }

    #[test]
    fn test_offline_provider_is_fetched_once_without_sleeping() {
        let clock = Arc::new(ManualTimeSource::new(Local::now()));
        let provider = RetryingProvider::new(
            crate::geo::SunriseProvider::new(),
            RetryPolicy::default(),
            clock.clone(),
        );
        let date = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();

        for location in [
            Location::new(48.8566, 2.3522, "Paris, France"),
            Location::new(69.6492, 18.9553, "Tromsø, Norway"),
        ] {
            assert!(provider.fetch(&location, date).is_ok());
        }
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_permanent_errors_are_not_retried() {
        let clock = ManualTimeSource::new(Local::now());
        let calls = Cell::new(0);

        let result: Result<(), _> = RetryPolicy::default().run(&clock, || {
            calls.set(calls.get() + 1);
            Err(PhaseError::LocationNotFound {
                query: "nowhere".to_string(),
            })
        });

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
        assert!(clock.sleeps().is_empty());
    }
}
