//! Scheduler state owned by the single scheduler thread.
//!
//! Everything that changes between refresh passes lives here: the active
//! location, the daily cache, the last phase that made it to the screen and the
//! `initial` flag that suppresses the cross-fade after a location change.

use crate::core::phase::Phase;
use crate::geo::{DailyCache, Location};
use crate::render::InfoOverlay;

/// Whether a refresh pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Refreshing,
}

#[derive(Debug)]
pub(super) struct SchedulerContext {
    state: SchedulerState,
    location: Option<Location>,
    /// City text last accepted from configuration, resolved or pending
    requested_city: Option<String>,
    cache: DailyCache,
    last_rendered: Option<Phase>,
    /// Set at startup and on every location change, consumed by the next classification
    initial: bool,
    last_overlay: Option<InfoOverlay>,
    /// Whether the "no location" warning was already shown
    no_location_reported: bool,
}

impl SchedulerContext {
    pub(super) fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            location: None,
            requested_city: None,
            cache: DailyCache::new(),
            last_rendered: None,
            initial: true,
            last_overlay: None,
            no_location_reported: false,
        }
    }

    pub(super) fn state(&self) -> SchedulerState {
        self.state
    }

    /// Move to Refreshing. Returns false if a pass is already running.
    pub(super) fn begin_refresh(&mut self) -> bool {
        if self.state == SchedulerState::Refreshing {
            return false;
        }
        self.state = SchedulerState::Refreshing;
        true
    }

    pub(super) fn end_refresh(&mut self) {
        self.state = SchedulerState::Idle;
    }

    pub(super) fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Switch to a new location: drop cached times and re-arm `initial`.
    pub(super) fn change_location(&mut self, location: Location) {
        self.location = Some(location);
        self.cache.invalidate();
        self.initial = true;
        self.last_overlay = None;
        self.no_location_reported = false;
    }

    pub(super) fn requested_city(&self) -> Option<&str> {
        self.requested_city.as_deref()
    }

    pub(super) fn set_requested_city(&mut self, city: Option<String>) {
        self.requested_city = city;
    }

    pub(super) fn cache(&self) -> &DailyCache {
        &self.cache
    }

    pub(super) fn cache_mut(&mut self) -> &mut DailyCache {
        &mut self.cache
    }

    pub(super) fn last_rendered(&self) -> Option<Phase> {
        self.last_rendered
    }

    pub(super) fn record_render(&mut self, phase: Phase) {
        self.last_rendered = Some(phase);
    }

    /// Consume the `initial` flag.
    pub(super) fn take_initial(&mut self) -> bool {
        std::mem::replace(&mut self.initial, false)
    }

    /// Put `initial` back after a failed render so the retry still skips the fade.
    pub(super) fn restore_initial(&mut self) {
        self.initial = true;
    }

    /// Store `overlay` and report whether it differs from the last one.
    pub(super) fn replace_overlay(&mut self, overlay: InfoOverlay) -> bool {
        if self.last_overlay.as_ref() == Some(&overlay) {
            return false;
        }
        self.last_overlay = Some(overlay);
        true
    }

    pub(super) fn clear_overlay(&mut self) {
        self.last_overlay = None;
    }

    /// Returns true the first time it is called after a location change.
    pub(super) fn should_report_no_location(&mut self) -> bool {
        !std::mem::replace(&mut self.no_location_reported, true)
    }
}
