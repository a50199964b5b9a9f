//! The transition scheduler.
//!
//! A single thread owns all scheduling state. On every tick of a fixed interval
//! it makes sure today's solar times are cached, classifies the current moment
//! (shifted forward by one interval) and asks the render surface for a new
//! wallpaper only when the phase actually changed.
//!
//! Everything else reaches the scheduler as a [`SignalMessage`] through one
//! channel: shutdown, config reload, forced refresh. City changes from the
//! configuration are debounced so typing a name into the config file does not
//! trigger a lookup per keystroke.
//!
//! Failures from the resolver, the provider or the surface are logged and
//! swallowed. A failed tick leaves the previous wallpaper on screen and never
//! affects the next tick.

pub mod context;
pub mod debounce;
pub mod phase;

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::common::utils;
use crate::config::Config;
use crate::core::context::SchedulerContext;
use crate::core::debounce::Debouncer;
use crate::core::phase::{Phase, classify};
use crate::error::PhaseError;
use crate::geo::{self, CacheEntry, Location, LocationResolver, SolarTimeProvider, SolarTimes};
use crate::io::signals::SignalMessage;
use crate::render::{OverlaySettings, RenderSurface};
use crate::time_source::TimeSource;

pub use context::SchedulerState;

/// Settings the scheduler reads from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    /// Time between ticks; also the classification lookahead.
    pub interval: Duration,
    /// Quiet period before a changed city is resolved.
    pub debounce: Duration,
    pub overlay: OverlaySettings,
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.update_interval(),
            debounce: config.debounce(),
            overlay: OverlaySettings::from_config(config),
        }
    }

    pub fn lookahead(&self) -> ChronoDuration {
        ChronoDuration::from_std(self.interval).unwrap_or_else(|_| ChronoDuration::zero())
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of one refresh pass.
#[derive(Debug)]
pub enum TickOutcome {
    /// The surface was asked to show a new phase.
    Rendered { phase: Phase, initial: bool },
    /// Classification matched what is already on screen.
    Unchanged(Phase),
    /// No location has been configured or resolved yet.
    NoLocation,
    /// A pass was already in progress.
    Skipped,
    /// Solar times could not be obtained.
    Failed(PhaseError),
    /// The surface rejected the new phase.
    RenderFailed(anyhow::Error),
}

impl TickOutcome {
    /// The phase this pass classified, if it got that far.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            TickOutcome::Rendered { phase, .. } | TickOutcome::Unchanged(phase) => Some(*phase),
            _ => None,
        }
    }
}

/// Collaborators and settings for [`Scheduler::new`].
pub struct SchedulerParams {
    pub resolver: Box<dyn LocationResolver>,
    pub provider: Box<dyn SolarTimeProvider>,
    pub surface: Box<dyn RenderSurface>,
    pub clock: Arc<dyn TimeSource>,
    pub settings: SchedulerSettings,
    pub debug_enabled: bool,
}

pub struct Scheduler {
    resolver: Box<dyn LocationResolver>,
    provider: Box<dyn SolarTimeProvider>,
    surface: Box<dyn RenderSurface>,
    clock: Arc<dyn TimeSource>,
    settings: SchedulerSettings,
    debug_enabled: bool,
    context: SchedulerContext,
    pending_city: Debouncer<String>,
}

impl Scheduler {
    pub fn new(params: SchedulerParams) -> Self {
        Self {
            pending_city: Debouncer::new(params.settings.debounce),
            resolver: params.resolver,
            provider: params.provider,
            surface: params.surface,
            clock: params.clock,
            settings: params.settings,
            debug_enabled: params.debug_enabled,
            context: SchedulerContext::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.context.state()
    }

    pub fn location(&self) -> Option<&Location> {
        self.context.location()
    }

    pub fn last_rendered(&self) -> Option<Phase> {
        self.context.last_rendered()
    }

    pub fn cache_entry(&self) -> Option<&CacheEntry> {
        self.context.cache().entry()
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// When a debounced city lookup is due, if one is pending.
    pub fn pending_city_deadline(&self) -> Option<Instant> {
        self.pending_city.deadline()
    }

    /// Run one refresh pass.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.context.begin_refresh() {
            return TickOutcome::Skipped;
        }
        let outcome = self.refresh_pass();
        self.context.end_refresh();

        self.report(&outcome);
        outcome
    }

    fn refresh_pass(&mut self) -> TickOutcome {
        let Some(location) = self.context.location().cloned() else {
            return TickOutcome::NoLocation;
        };

        let now = self.clock.now();
        // Keyed by this machine's calendar day, not the location's
        let times = match self.context.cache_mut().get_or_fetch(
            self.provider.as_ref(),
            &location,
            now.date_naive(),
        ) {
            Ok(times) => times,
            Err(e) => return TickOutcome::Failed(e),
        };

        let phase = classify(now.with_timezone(&Utc), &times, self.settings.lookahead());
        let initial = self.context.take_initial();

        let overlay_changed = self.push_overlay(&location, &times);

        if self.context.last_rendered() == Some(phase) {
            if overlay_changed {
                self.redraw();
            }
            return TickOutcome::Unchanged(phase);
        }

        match self.surface.render(phase, initial) {
            Ok(()) => {
                self.context.record_render(phase);
                TickOutcome::Rendered { phase, initial }
            }
            Err(e) => {
                if initial {
                    self.context.restore_initial();
                }
                TickOutcome::RenderFailed(e)
            }
        }
    }

    /// Send the overlay to the surface if its content changed.
    ///
    /// Returns true when the surface accepted a new overlay.
    fn push_overlay(&mut self, location: &Location, times: &SolarTimes) -> bool {
        let overlay = geo::display::build_overlay(location, times, &self.settings.overlay);
        if !self.context.replace_overlay(overlay.clone()) {
            return false;
        }
        if let Err(e) = self.surface.update_overlay(&overlay) {
            log_pipe!();
            log_warning!("Failed to update overlay: {e}");
            self.context.clear_overlay();
            return false;
        }
        true
    }

    /// Re-show the current phase with the new overlay.
    fn redraw(&mut self) {
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Overlay changed, redrawing via {} surface", self.surface.name());
        }
        if let Err(e) = self.surface.redraw() {
            log_pipe!();
            log_warning!("Failed to redraw overlay: {e:#}");
            // Pushed again on the next tick
            self.context.clear_overlay();
        }
    }

    fn report(&mut self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::Rendered { phase, initial } => {
                log_block_start!("Phase: {phase}");
                if self.debug_enabled {
                    log_indented!(
                        "Rendering {} via {} surface{}",
                        phase.file_stem(),
                        self.surface.name(),
                        if *initial { " (no fade)" } else { "" }
                    );
                }
            }
            TickOutcome::Unchanged(phase) => {
                if self.debug_enabled {
                    log_pipe!();
                    log_debug!("Phase unchanged: {phase}");
                }
            }
            TickOutcome::NoLocation => {
                if self.context.should_report_no_location() {
                    log_pipe!();
                    log_warning!("No location configured");
                    log_indented!("Set `city` or `latitude`/`longitude` in the configuration");
                }
            }
            TickOutcome::Skipped => {
                if self.debug_enabled {
                    log_pipe!();
                    log_debug!("Refresh already in progress, skipping tick");
                }
            }
            TickOutcome::Failed(e) => {
                log_pipe!();
                log_error!("Could not get solar times: {e}");
                self.log_keeping_current();
            }
            TickOutcome::RenderFailed(e) => {
                log_pipe!();
                log_error!("Render failed: {e:#}");
                self.log_keeping_current();
            }
        }
    }

    fn log_keeping_current(&self) {
        let retry_in = utils::plural(self.settings.interval.as_secs() / 60, "minute");
        match self.context.last_rendered() {
            Some(phase) => log_indented!("Keeping {phase} wallpaper, retrying in {retry_in}"),
            None => log_indented!("Retrying in {retry_in}"),
        }
    }

    /// Resolve `city` and, on success, switch to it with a forced refresh.
    ///
    /// A failed lookup changes nothing: the current location, cache and
    /// wallpaper all stay as they were.
    pub fn update_city(&mut self, city: &str) -> Result<TickOutcome, PhaseError> {
        log_block_start!("Looking up \"{}\"...", city.trim());

        match geo::resolve(self.resolver.as_ref(), city) {
            Ok(location) => Ok(self.set_location(location)),
            Err(e) => {
                log_pipe!();
                log_error!("{e}");
                match self.context.location() {
                    Some(current) => log_indented!("Keeping location {}", current.name),
                    None => log_indented!("No location set yet"),
                }
                Err(e)
            }
        }
    }

    /// Switch to `location`, invalidate the cache and refresh immediately.
    pub fn set_location(&mut self, location: Location) -> TickOutcome {
        log_block_start!(
            "Location: {} ({})",
            location.name,
            utils::format_coordinates(location.latitude, location.longitude)
        );
        self.context.change_location(location);
        self.tick()
    }

    /// Apply a configuration at startup: a configured city is resolved right away.
    pub fn start(&mut self, config: &Config) {
        self.apply(config, Instant::now(), true);

        if self.context.location().is_none() {
            self.tick();
        }
    }

    /// Apply a reloaded configuration.
    ///
    /// Overlay toggles and the interval take effect immediately, coordinates
    /// switch the location directly and a changed city goes through the debouncer.
    pub fn apply_config(&mut self, config: &Config, now: Instant) {
        self.apply(config, now, false);
    }

    fn apply(&mut self, config: &Config, now: Instant, immediate: bool) {
        let settings = SchedulerSettings::from_config(config);
        if settings != self.settings {
            self.apply_settings(settings);
        }

        if let Some((latitude, longitude)) = config.coordinates() {
            self.pending_city.cancel();
            self.context.set_requested_city(None);

            let name = config
                .city()
                .map(str::to_string)
                .unwrap_or_else(|| utils::format_coordinates(latitude, longitude));
            let location = Location::new(latitude, longitude, name);

            if self.context.location() != Some(&location) {
                self.set_location(location);
            }
            return;
        }

        let Some(city) = config.city() else {
            self.pending_city.cancel();
            self.context.set_requested_city(None);
            return;
        };

        if self.context.requested_city() == Some(city) {
            return;
        }
        self.context.set_requested_city(Some(city.to_string()));

        if immediate || self.settings.debounce.is_zero() {
            self.pending_city.cancel();
            if let Err(e) = self.update_city(city)
                && self.debug_enabled
            {
                log_pipe!();
                log_debug!("Startup city lookup failed, waiting for a config change: {e}");
            }
        } else {
            self.pending_city.submit(city.to_string(), now);
            if self.debug_enabled {
                log_pipe!();
                log_debug!(
                    "City change to \"{city}\" queued for {}ms",
                    self.settings.debounce.as_millis()
                );
            }
        }
    }

    fn apply_settings(&mut self, settings: SchedulerSettings) {
        if settings.interval != self.settings.interval {
            log_decorated!(
                "Update interval: {}",
                utils::plural(settings.interval.as_secs() / 60, "minute")
            );
        }
        self.pending_city.set_delay(settings.debounce);

        let overlay_changed = settings.overlay != self.settings.overlay;
        self.settings = settings;

        if overlay_changed
            && let Some(location) = self.context.location().cloned()
            && let Some(entry) = self.context.cache().entry().copied()
            && self.push_overlay(&location, &entry.times)
            && self.context.last_rendered().is_some()
        {
            self.redraw();
        }
    }

    /// When the next tick is due, counted from `now` if the interval changed.
    fn reschedule(&self, next_tick: Instant, interval_before: Duration, now: Instant) -> Instant {
        if self.settings.interval == interval_before {
            next_tick
        } else {
            now + self.settings.interval
        }
    }

    /// Resolve the pending city if its debounce delay has passed.
    pub fn poll_pending(&mut self, now: Instant) -> Option<TickOutcome> {
        let city = self.pending_city.take_due(now)?;
        self.update_city(&city).ok()
    }

    /// Handle one message from the signal or watcher threads.
    ///
    /// Returns false when the loop should stop.
    pub fn handle_message(&mut self, message: SignalMessage) -> bool {
        match message {
            SignalMessage::Shutdown => return false,
            SignalMessage::Reload => {
                log_block_start!("Reloading configuration...");
                match Config::load() {
                    Ok(config) => self.apply_config(&config, Instant::now()),
                    Err(e) => {
                        log_pipe!();
                        log_error!("Failed to reload configuration: {e:#}");
                        log_indented!("Continuing with the previous configuration");
                    }
                }
            }
            SignalMessage::Refresh => {
                if self.debug_enabled {
                    log_pipe!();
                    log_debug!("Forced refresh requested");
                }
                self.tick();
            }
        }
        true
    }

    /// Main loop: tick every interval until shutdown or the simulation ends.
    pub fn run(&mut self, events: &Receiver<SignalMessage>, running: &AtomicBool) -> Result<()> {
        let mut next_tick = Instant::now() + self.settings.interval;
        let mut disconnected = false;

        while running.load(Ordering::SeqCst) && !self.clock.is_ended() {
            if self.clock.is_simulated() {
                self.clock.sleep(self.settings.interval);
                while let Ok(message) = events.try_recv() {
                    if !self.handle_message(message) {
                        return Ok(());
                    }
                }
                self.poll_pending(Instant::now());
                self.tick();
                continue;
            }

            let wake_at = self
                .pending_city
                .deadline()
                .map_or(next_tick, |due| due.min(next_tick));
            let timeout = wake_at.saturating_duration_since(Instant::now());

            if disconnected {
                std::thread::sleep(timeout);
            } else {
                match events.recv_timeout(timeout) {
                    Ok(message) => {
                        let interval_before = self.settings.interval;
                        if !self.handle_message(message) {
                            break;
                        }
                        next_tick = self.reschedule(next_tick, interval_before, Instant::now());
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        log_pipe!();
                        log_warning!("Signal channel closed, continuing on the timer only");
                        disconnected = true;
                    }
                }
            }

            let now = Instant::now();
            self.poll_pending(now);
            if now >= next_tick {
                self.tick();
                next_tick = now + self.settings.interval;
            }
        }

        Ok(())
    }
}
