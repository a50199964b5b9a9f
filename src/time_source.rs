//! Time source abstraction for supporting both real-time and simulated time.
//!
//! The scheduler never reads the system clock directly: it owns an
//! `Arc<dyn TimeSource>`, which lets the `simulate` command fast-forward through a
//! whole day and lets tests drive the loop with a manual clock. A process-wide
//! instance is also registered so the logger can stamp simulated output.

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};
use std::time::{Duration as StdDuration, Instant};

/// Global time source instance, defaults to RealTimeSource
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Simulated time source for time-accelerated runs.
///
/// Two modes:
/// - Linear acceleration: simulated time flows at `multiplier` times real time
/// - Fast-forward (`multiplier == 0.0`): each sleep jumps the clock instantly
pub struct SimulatedTimeSource {
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
    time_multiplier: f64,
    /// Simulated time elapsed through completed sleeps
    elapsed: Mutex<StdDuration>,
    /// In-progress sleep: (real start instant, simulated duration being slept)
    sleep_in_progress: Mutex<Option<(Instant, StdDuration)>>,
}

impl SimulatedTimeSource {
    /// Create a new simulated time source.
    ///
    /// A negative multiplier falls back to one simulated hour per real second.
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        Self {
            start_time,
            end_time,
            time_multiplier: if multiplier < 0.0 { 3600.0 } else { multiplier },
            elapsed: Mutex::new(StdDuration::ZERO),
            sleep_in_progress: Mutex::new(None),
        }
    }

    fn is_fast_forward(&self) -> bool {
        self.time_multiplier == 0.0
    }

    fn current_time(&self) -> DateTime<Local> {
        let mut total = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());

        if !self.is_fast_forward()
            && let Some((started, simulated)) =
                *self.sleep_in_progress.lock().unwrap_or_else(|e| e.into_inner())
        {
            let progressed = started.elapsed().as_secs_f64() * self.time_multiplier;
            total += StdDuration::from_secs_f64(progressed.min(simulated.as_secs_f64()));
        }

        let simulated = self.start_time
            + ChronoDuration::from_std(total).unwrap_or_else(|_| ChronoDuration::zero());
        simulated.min(self.end_time)
    }

    fn remaining(&self) -> StdDuration {
        (self.end_time - self.current_time())
            .to_std()
            .unwrap_or(StdDuration::ZERO)
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.current_time()
    }

    fn sleep(&self, duration: StdDuration) {
        let step = duration.min(self.remaining());
        if step.is_zero() {
            return;
        }

        if self.is_fast_forward() {
            // Yield briefly so log output keeps up with the jumps
            std::thread::sleep(StdDuration::from_millis(1));
        } else {
            *self
                .sleep_in_progress
                .lock()
                .unwrap_or_else(|e| e.into_inner()) = Some((Instant::now(), step));
            std::thread::sleep(StdDuration::from_secs_f64(
                step.as_secs_f64() / self.time_multiplier,
            ));
            *self
                .sleep_in_progress
                .lock()
                .unwrap_or_else(|e| e.into_inner()) = None;
        }

        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner()) += step;
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current_time() >= self.end_time
    }
}

/// Initialize the global time source (call once at startup)
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the time source has been initialized
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// The global time source, initializing it to real time if nothing was registered
pub fn current() -> Arc<dyn TimeSource> {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .clone()
}

/// Get the current time from the global time source
pub fn now() -> DateTime<Local> {
    current().now()
}

/// Check if we're running in simulation mode
pub fn is_simulated() -> bool {
    current().is_simulated()
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS" as local time
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    use chrono::NaiveDateTime;

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;
    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| "Ambiguous or invalid local time".to_string())
}
