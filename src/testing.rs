//! Test doubles for the scheduler's collaborators.
//!
//! Compiled for unit tests and, through the `testing-support` feature, for the
//! integration tests under `tests/`.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::phase::Phase;
use crate::error::PhaseError;
use crate::geo::{Candidate, Location, LocationResolver, PlaceKind, SolarTimeProvider, SolarTimes};
use crate::render::{InfoOverlay, RenderSurface};
use crate::time_source::TimeSource;

/// Local wall-clock time on the machine running the tests.
pub fn local_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .earliest()
        .expect("valid local test time")
}

fn local_on(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let naive = date.and_hms_opt(hour, minute, 0).expect("valid test time");
    Local
        .from_local_datetime(&naive)
        .earliest()
        .expect("valid local test time")
        .with_timezone(&Utc)
}

/// A regular equinox-like day in the machine's local time:
/// twilight 05:30, sunrise 06:00, noon 12:00, sunset 18:00, twilight end 18:30.
pub fn solar_times_on(date: NaiveDate) -> SolarTimes {
    SolarTimes::new(
        local_on(date, 5, 30),
        local_on(date, 6, 0),
        local_on(date, 12, 0),
        local_on(date, 18, 0),
        local_on(date, 18, 30),
    )
    .expect("ordered test solar times")
}

/// Clock that only moves when told to. Sleeping advances it instantly.
pub struct ManualTimeSource {
    now: Mutex<DateTime<Local>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualTimeSource {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, time: DateTime<Local>) {
        *self.now.lock().unwrap() = time;
    }

    pub fn advance(&self, by: ChronoDuration) {
        *self.now.lock().unwrap() += by;
    }

    /// Every duration passed to `sleep`, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        if let Ok(step) = ChronoDuration::from_std(duration) {
            self.advance(step);
        }
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Resolver over a fixed list of cities, matching names case-insensitively.
#[derive(Clone, Default)]
pub struct FakeResolver {
    cities: Vec<Candidate>,
    searches: Arc<AtomicUsize>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, name: &str, country: &str, latitude: f64, longitude: f64) -> Self {
        self.cities.push(Candidate {
            latitude,
            longitude,
            locality: name.to_string(),
            country: country.to_string(),
            kind: PlaceKind::City,
        });
        self
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

impl LocationResolver for FakeResolver {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, PhaseError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let city = query.split(',').next().unwrap_or_default().trim();
        Ok(self
            .cities
            .iter()
            .filter(|c| c.locality.eq_ignore_ascii_case(city))
            .cloned()
            .collect())
    }
}

/// Provider returning [`solar_times_on`] for any location, counting calls.
///
/// Errors queued with [`CountingProvider::fail_next`] are returned first.
#[derive(Clone, Default)]
pub struct CountingProvider {
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(String, NaiveDate)>>>,
    failures: Arc<Mutex<VecDeque<PhaseError>>>,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Location names and dates of every fetch, in order.
    pub fn requests(&self) -> Vec<(String, NaiveDate)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn fail_next(&self, error: PhaseError) {
        self.failures.lock().unwrap().push_back(error);
    }
}

impl SolarTimeProvider for CountingProvider {
    fn fetch(&self, location: &Location, date: NaiveDate) -> Result<SolarTimes, PhaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((location.name.clone(), date));

        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(solar_times_on(date)),
        }
    }
}

/// Surface that records every render call and overlay update.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    renders: Arc<Mutex<Vec<(Phase, bool)>>>,
    overlays: Arc<Mutex<Vec<InfoOverlay>>>,
    redraws: Arc<AtomicUsize>,
    fail_next: Arc<AtomicBool>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful render calls as `(phase, initial)`.
    pub fn renders(&self) -> Vec<(Phase, bool)> {
        self.renders.lock().unwrap().clone()
    }

    pub fn overlays(&self) -> Vec<InfoOverlay> {
        self.overlays.lock().unwrap().clone()
    }

    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }

    /// Make the next render call fail.
    pub fn fail_next_render(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl RenderSurface for RecordingSurface {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn render(&mut self, phase: Phase, initial: bool) -> anyhow::Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            anyhow::bail!("wallpaper setter unavailable");
        }
        self.renders.lock().unwrap().push((phase, initial));
        Ok(())
    }

    fn update_overlay(&mut self, overlay: &InfoOverlay) -> anyhow::Result<()> {
        self.overlays.lock().unwrap().push(overlay.clone());
        Ok(())
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        self.redraws.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
