//! Application coordinator for the phasewall daemon.
//!
//! Owns the process-level resources (lock file, signal thread, config watcher)
//! and wires the production collaborators into a [`Scheduler`]:
//! - `CityResolver` for offline city lookup
//! - `SunriseProvider` wrapped in a `RetryingProvider` for solar times
//! - the surface chosen by `render::create_surface`
//!
//! `Phasewall::new(debug).run()` is the normal startup; the simulate command uses
//! `Phasewall::new(debug).without_lock().without_headers().run()` so it can run
//! next to a real instance.

use anyhow::Result;

use crate::{
    config::{self, Config},
    core::{Scheduler, SchedulerParams, SchedulerSettings},
    geo::{CityResolver, RetryPolicy, RetryingProvider, SunriseProvider},
    io::{lock, signals::setup_signal_handler},
    render::create_surface,
    time_source,
};

/// Builder for configuring and running the daemon.
pub struct Phasewall {
    debug_enabled: bool,
    create_lock: bool,
    show_headers: bool,
}

impl Phasewall {
    /// Create a new runner with defaults matching a normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            create_lock: true,
            show_headers: true,
        }
    }

    /// Skip single-instance locking
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Skip the version header (the caller already printed one)
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Run until a shutdown signal arrives or simulated time runs out.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{e:?}");
                std::process::exit(1);
            }
        };

        // Held until run() returns; dropping it releases the lock
        let _lock = if self.create_lock {
            Some(lock::acquire_lock()?)
        } else {
            None
        };

        let signal_state = setup_signal_handler(self.debug_enabled)?;

        match config::get_config_path() {
            Ok(path) => {
                if let Err(e) = config::start_config_watcher(
                    &path,
                    signal_state.signal_sender.clone(),
                    self.debug_enabled,
                ) {
                    log_pipe!();
                    log_warning!("Config file watching unavailable: {e}");
                    log_indented!("Hot reload disabled, use `phasewall reload` instead");
                }
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Could not determine config path: {e}");
            }
        }

        config.log_config();

        let clock = time_source::current();
        let surface = create_surface(&config);
        log_block_start!("Render surface: {}", surface.name());

        let mut scheduler = Scheduler::new(SchedulerParams {
            resolver: Box::new(CityResolver::new()),
            // Offline provider: the retry path stays idle until a remote one is plugged in
            provider: Box::new(RetryingProvider::new(
                SunriseProvider::new(),
                RetryPolicy::default(),
                clock.clone(),
            )),
            surface,
            clock,
            settings: SchedulerSettings::from_config(&config),
            debug_enabled: self.debug_enabled,
        });

        scheduler.start(&config);
        scheduler.run(&signal_state.signal_receiver, &signal_state.running)?;

        log_block_start!("Shutting down...");
        log_end!();
        Ok(())
    }
}
