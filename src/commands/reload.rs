//! Implementation of the `reload` command.
//!
//! Validates the configuration first so a broken file is reported here rather
//! than silently ignored by the daemon, then sends `SIGUSR2` to the running
//! instance found through the lock file.

use anyhow::{Context, Result};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

use crate::config::Config;
use crate::io::lock;

/// Handle `phasewall reload`.
pub fn handle_reload_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    Config::load().context("Configuration is invalid, not reloading")?;

    let Some(pid) = lock::running_pid() else {
        log_pipe!();
        log_warning!("phasewall is not running");
        log_indented!("Start it with: phasewall");
        log_end!();
        return Ok(());
    };

    let raw = i32::try_from(pid).context("PID out of range")?;
    kill(Pid::from_raw(raw), Signal::SIGUSR2)
        .with_context(|| format!("Failed to signal phasewall (PID {pid})"))?;

    log_block_start!("Sent reload signal to phasewall (PID {pid})");
    if debug_enabled {
        log_indented!("Lock file: {}", lock::lock_path().display());
    }
    log_end!();
    Ok(())
}
