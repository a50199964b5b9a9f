//! Implementation of the `simulate` command.
//!
//! Installs a [`SimulatedTimeSource`] as the global clock and runs the daemon on
//! it, so a whole day of phase changes can be watched in seconds. Simulation
//! never takes the instance lock and can run next to a real daemon.

use anyhow::{Result, anyhow};
use chrono::Local;
use std::sync::Arc;

use crate::Phasewall;
use crate::logger::Log;
use crate::time_source::{self, SimulatedTimeSource};

/// Handle `phasewall simulate START END [MULTIPLIER | --fast-forward] [--log]`.
///
/// `multiplier` is simulated seconds per real second; `0.0` fast-forwards.
pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    multiplier: f64,
    log_to_file: bool,
    debug_enabled: bool,
) -> Result<()> {
    let start =
        time_source::parse_datetime(start_time).map_err(|e| anyhow!("Invalid start time: {e}"))?;
    let end =
        time_source::parse_datetime(end_time).map_err(|e| anyhow!("Invalid end time: {e}"))?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    // Must happen before any logging so timestamps are simulated from the start
    time_source::init_time_source(Arc::new(SimulatedTimeSource::new(start, end, multiplier)));

    let _log_guard = if log_to_file {
        let file_name = format!(
            "phasewall-simulation-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        );
        println!("Writing simulation output to {file_name}");
        Some(Log::start_file_logging(file_name)?)
    } else {
        None
    };

    log_version!();
    log_block_start!("Simulation mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );

    let duration = end.signed_duration_since(start);
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );
    if multiplier == 0.0 {
        log_indented!("Time acceleration: fast-forward");
    } else {
        log_indented!(
            "Time acceleration: {multiplier}x (about {:.1} seconds)",
            duration.num_seconds() as f64 / multiplier
        );
    }

    Phasewall::new(debug_enabled)
        .without_lock()
        .without_headers()
        .run()
}
