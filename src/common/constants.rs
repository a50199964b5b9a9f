//! Application-wide constants and defaults.
//!
//! Every tunable default lives here so the configuration loader, the validator and
//! the scheduler agree on the same values and limits.

// # Application Identity

pub const APP_NAME: &str = "phasewall";
pub const CONFIG_FILE_NAME: &str = "phasewall.toml";
pub const LOCK_FILE_NAME: &str = "phasewall.lock";

// # Configuration Defaults

pub const DEFAULT_UPDATE_INTERVAL: u64 = 10; // minutes between ticks (also the lookahead)
pub const DEFAULT_DEBOUNCE: u64 = 2000; // milliseconds of quiet before a city change is resolved
pub const DEFAULT_SHOW_CITY: bool = true;
pub const DEFAULT_SHOW_SUN_TIMES: bool = true;
pub const DEFAULT_INFO_SIZE: f64 = 1.0;
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

// # Validation Limits

pub const MINIMUM_UPDATE_INTERVAL: u64 = 1; // minutes
pub const MAXIMUM_UPDATE_INTERVAL: u64 = 60; // minutes
pub const MAXIMUM_DEBOUNCE: u64 = 10_000; // milliseconds
pub const MINIMUM_INFO_SIZE: f64 = 0.25;
pub const MAXIMUM_INFO_SIZE: f64 = 4.0;
pub const MAXIMUM_FADE_DURATION: u64 = 3600; // seconds

// # Solar Phase Boundaries

/// Width of the Sunrise and Sunset phases, and of GoldenHour before sunset
pub const SUN_EVENT_WINDOW_MINUTES: i64 = 30;

/// Latitudes beyond this are clamped before solar calculation (degrees)
pub const MAXIMUM_SOLAR_LATITUDE: f64 = 65.0;

// # Provider Retry Policy

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_INITIAL_DELAY_MS: u64 = 1000;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 30_000;
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 2.0;

// # Runtime

/// Quiet period after a config file event before it is reloaded
pub const CONFIG_WATCH_DEBOUNCE_MS: u64 = 500;

/// Simulated seconds per real second when `simulate` gets no multiplier
pub const DEFAULT_SIMULATION_MULTIPLIER: f64 = 3600.0;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
