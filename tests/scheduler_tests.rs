use chrono::{Duration as ChronoDuration, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

use phasewall::config::Config;
use phasewall::core::{Scheduler, SchedulerParams, SchedulerSettings, SchedulerState, TickOutcome};
use phasewall::geo::Location;
use phasewall::io::signals::SignalMessage;
use phasewall::logger::Log;
use phasewall::render::{CommandSurface, OverlaySettings};
use phasewall::testing::{
    CountingProvider, FakeResolver, ManualTimeSource, RecordingSurface, local_time,
};
use phasewall::{Phase, PhaseError};

struct Harness {
    scheduler: Scheduler,
    provider: CountingProvider,
    surface: RecordingSurface,
    resolver: FakeResolver,
    clock: Arc<ManualTimeSource>,
}

fn harness(hour: u32, minute: u32) -> Harness {
    Log::set_enabled(false);

    let clock = Arc::new(ManualTimeSource::new(local_time(2024, 3, 20, hour, minute)));
    let provider = CountingProvider::new();
    let surface = RecordingSurface::new();
    let resolver = FakeResolver::new()
        .with_city("Paris", "France", 48.8566, 2.3522)
        .with_city("Tokyo", "Japan", 35.6762, 139.6503);

    let scheduler = Scheduler::new(SchedulerParams {
        resolver: Box::new(resolver.clone()),
        provider: Box::new(provider.clone()),
        surface: Box::new(surface.clone()),
        clock: clock.clone(),
        settings: SchedulerSettings {
            interval: Duration::from_secs(600),
            debounce: Duration::from_millis(2000),
            overlay: OverlaySettings::default(),
        },
        debug_enabled: false,
    });

    Harness {
        scheduler,
        provider,
        surface,
        resolver,
        clock,
    }
}

fn paris() -> Location {
    Location::new(48.8566, 2.3522, "Paris, France")
}

#[test]
fn test_render_is_suppressed_while_phase_is_unchanged() {
    let mut h = harness(9, 0);

    h.scheduler.set_location(paris());
    for _ in 0..5 {
        h.clock.advance(ChronoDuration::minutes(10));
        assert!(matches!(
            h.scheduler.tick(),
            TickOutcome::Unchanged(Phase::Morning)
        ));
    }

    assert_eq!(h.surface.renders(), vec![(Phase::Morning, true)]);
    assert_eq!(h.scheduler.state(), SchedulerState::Idle);
}

#[test]
fn test_phase_changes_through_the_evening() {
    // 17:25 plus ten minutes of lookahead is already golden hour
    let mut h = harness(17, 25);

    h.scheduler.set_location(paris());
    h.clock.set(local_time(2024, 3, 20, 17, 55));
    h.scheduler.tick();
    h.clock.set(local_time(2024, 3, 20, 19, 0));
    h.scheduler.tick();

    assert_eq!(
        h.surface.renders(),
        vec![
            (Phase::GoldenHour, true),
            (Phase::Sunset, false),
            (Phase::Night, false),
        ]
    );
}

#[test]
fn test_unknown_city_keeps_everything_in_place() {
    let mut h = harness(9, 0);

    h.scheduler.update_city("Paris").unwrap();
    let entry_before = h.scheduler.cache_entry().copied();
    assert_eq!(h.provider.calls(), 1);

    let err = h.scheduler.update_city("Atlantis").unwrap_err();

    assert_eq!(
        err,
        PhaseError::LocationNotFound {
            query: "Atlantis".to_string()
        }
    );
    assert_eq!(h.scheduler.location().unwrap().name, "Paris, France");
    assert_eq!(h.scheduler.cache_entry().copied(), entry_before);
    assert_eq!(h.scheduler.last_rendered(), Some(Phase::Morning));
    assert_eq!(h.provider.calls(), 1);
    assert_eq!(h.surface.renders().len(), 1);
    assert_eq!(h.resolver.searches(), 2);
}

#[test]
fn test_solar_times_fetched_once_per_day() {
    let mut h = harness(9, 0);

    h.scheduler.set_location(paris());
    for _ in 0..10 {
        h.clock.advance(ChronoDuration::minutes(10));
        h.scheduler.tick();
    }
    assert_eq!(h.provider.calls(), 1);

    h.clock.set(local_time(2024, 3, 21, 0, 30));
    h.scheduler.tick();
    h.scheduler.tick();

    let dates: Vec<NaiveDate> = h.provider.requests().into_iter().map(|(_, d)| d).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 21).unwrap(),
        ]
    );
}

#[test]
fn test_location_change_invalidates_cache_and_sets_initial() {
    let mut h = harness(19, 0);

    h.scheduler.update_city("Paris").unwrap();
    h.clock.set(local_time(2024, 3, 20, 9, 0));
    let outcome = h.scheduler.update_city("Tokyo").unwrap();

    assert!(matches!(
        outcome,
        TickOutcome::Rendered {
            phase: Phase::Morning,
            initial: true
        }
    ));
    let names: Vec<String> = h.provider.requests().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Paris, France", "Tokyo, Japan"]);
    assert_eq!(
        h.surface.renders(),
        vec![(Phase::Night, true), (Phase::Morning, true)]
    );
}

#[test]
fn test_initial_is_only_set_for_first_render() {
    let mut h = harness(5, 0);

    h.scheduler.set_location(paris());
    h.clock.set(local_time(2024, 3, 20, 6, 0));
    h.scheduler.tick();

    assert_eq!(
        h.surface.renders(),
        vec![(Phase::Night, true), (Phase::Sunrise, false)]
    );
}

#[test]
fn test_provider_failure_keeps_last_phase_and_recovers() {
    let mut h = harness(9, 0);

    h.scheduler.set_location(paris());
    assert_eq!(h.scheduler.last_rendered(), Some(Phase::Morning));

    // Next day, first fetch fails
    h.provider.fail_next(PhaseError::Network {
        provider: "solar provider",
        message: "timeout".to_string(),
    });
    h.clock.set(local_time(2024, 3, 21, 12, 0));

    assert!(matches!(h.scheduler.tick(), TickOutcome::Failed(_)));
    assert_eq!(h.scheduler.last_rendered(), Some(Phase::Morning));
    assert_eq!(h.scheduler.state(), SchedulerState::Idle);

    assert!(matches!(
        h.scheduler.tick(),
        TickOutcome::Rendered {
            phase: Phase::Day,
            initial: false
        }
    ));
    assert_eq!(h.provider.calls(), 3);
}

#[test]
fn test_render_failure_is_retried_on_next_tick() {
    let mut h = harness(9, 0);

    h.surface.fail_next_render();
    assert!(matches!(
        h.scheduler.set_location(paris()),
        TickOutcome::RenderFailed(_)
    ));
    assert_eq!(h.scheduler.last_rendered(), None);

    h.clock.advance(ChronoDuration::minutes(10));
    h.scheduler.tick();

    assert_eq!(h.surface.renders(), vec![(Phase::Morning, true)]);
}

#[test]
fn test_overlay_follows_location() {
    let mut h = harness(9, 0);

    h.scheduler.set_location(paris());
    h.scheduler.tick();

    let overlays = h.surface.overlays();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].location.as_deref(), Some("Paris, France"));
    assert!(overlays[0].sun_times.is_some());
}

#[test]
fn test_run_handles_refresh_then_shutdown() {
    let mut h = harness(9, 0);
    h.scheduler.set_location(paris());

    let (tx, rx) = mpsc::channel();
    tx.send(SignalMessage::Refresh).unwrap();
    tx.send(SignalMessage::Shutdown).unwrap();

    let running = AtomicBool::new(true);
    h.scheduler.run(&rx, &running).unwrap();

    // The forced refresh hits the cache and leaves the wallpaper alone
    assert_eq!(h.provider.calls(), 1);
    assert_eq!(h.surface.renders().len(), 1);
}

/// Scheduler driving a real command surface that appends
/// `<phase index> <initial> <city>` to `calls.log` in `dir`.
fn command_scheduler(dir: &Path, clock: Arc<ManualTimeSource>) -> (Scheduler, PathBuf) {
    Log::set_enabled(false);

    let out = dir.join("calls.log");
    let command = format!(
        "echo \"$PHASEWALL_PHASE_INDEX $PHASEWALL_INITIAL $PHASEWALL_CITY\" >> '{}'",
        out.display()
    );
    let surface = CommandSurface::new(
        &command,
        dir.to_path_buf(),
        "png",
        Duration::from_secs(600),
    );

    let scheduler = Scheduler::new(SchedulerParams {
        resolver: Box::new(FakeResolver::new()),
        provider: Box::new(CountingProvider::new()),
        surface: Box::new(surface),
        clock,
        settings: SchedulerSettings {
            interval: Duration::from_secs(600),
            debounce: Duration::from_millis(2000),
            overlay: OverlaySettings::default(),
        },
        debug_enabled: false,
    });

    (scheduler, out)
}

fn command_calls(out: &Path) -> Vec<String> {
    fs::read_to_string(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_new_city_reaches_command_when_phase_is_unchanged() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualTimeSource::new(local_time(2024, 3, 20, 9, 0)));
    let (mut scheduler, out) = command_scheduler(dir.path(), clock.clone());

    assert!(matches!(
        scheduler.set_location(paris()),
        TickOutcome::Rendered {
            phase: Phase::Morning,
            initial: true
        }
    ));

    clock.advance(ChronoDuration::minutes(10));
    let outcome = scheduler.set_location(Location::new(45.764, 4.8357, "Lyon, France"));
    assert!(matches!(outcome, TickOutcome::Unchanged(Phase::Morning)));

    assert_eq!(
        command_calls(&out),
        vec!["3 1 Paris, France", "3 1 Lyon, France"]
    );

    // Same city and phase on the next tick: nothing new to show
    clock.advance(ChronoDuration::minutes(10));
    scheduler.tick();
    assert_eq!(command_calls(&out).len(), 2);
}

#[test]
fn test_show_city_toggle_reaches_command_on_reload() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualTimeSource::new(local_time(2024, 3, 20, 9, 0)));
    let (mut scheduler, out) = command_scheduler(dir.path(), clock);

    scheduler.set_location(paris());

    let hidden = Config {
        show_city: Some(false),
        ..Config::default()
    };
    scheduler.apply_config(&hidden, Instant::now());
    scheduler.apply_config(&Config::default(), Instant::now());

    assert_eq!(
        command_calls(&out),
        vec!["3 1 Paris, France", "3 1 ", "3 1 Paris, France"]
    );
    assert_eq!(scheduler.last_rendered(), Some(Phase::Morning));
}
