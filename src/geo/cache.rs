//! Per-day cache of solar times.
//!
//! Holds at most one entry. An entry is valid for the local calendar date it was
//! fetched on; a new date, or an explicit [`DailyCache::invalidate`] after a
//! location change, causes exactly one new provider call on the next lookup.

use chrono::NaiveDate;

use crate::error::PhaseError;
use crate::geo::{Location, SolarTimeProvider, SolarTimes};

/// The single cached fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    /// Local date of the fetch (the date that was requested).
    pub fetched_on: NaiveDate,
    pub times: SolarTimes,
}

#[derive(Debug, Default)]
pub struct DailyCache {
    entry: Option<CacheEntry>,
}

impl DailyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return today's times, fetching them only when the cache is empty or stale.
    ///
    /// A failed fetch leaves any existing entry untouched.
    pub fn get_or_fetch(
        &mut self,
        provider: &dyn SolarTimeProvider,
        location: &Location,
        today: NaiveDate,
    ) -> Result<SolarTimes, PhaseError> {
        if let Some(entry) = self.entry
            && entry.fetched_on == today
        {
            return Ok(entry.times);
        }

        let times = provider.fetch(location, today)?;
        self.entry = Some(CacheEntry {
            fetched_on: today,
            times,
        });
        Ok(times)
    }

    /// Drop the cached entry. Idempotent.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn entry(&self) -> Option<&CacheEntry> {
        self.entry.as_ref()
    }

    pub fn is_valid_for(&self, today: NaiveDate) -> bool {
        self.entry.is_some_and(|entry| entry.fetched_on == today)
    }
}
