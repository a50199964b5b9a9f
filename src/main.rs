//! Main application entry point.
//!
//! Parses the command line and dispatches to the daemon or to one of the
//! one-shot commands. All application logic lives in the library crate so it
//! can be exercised by the integration tests:
//!
//! - `args`: command-line parsing
//! - `commands`: `now`, `reload`, `simulate`, help output
//! - `Phasewall`: the daemon lifecycle (lock, signals, watcher, scheduler)
//!
//! Errors bubbling up here are printed once with their full context chain and
//! turned into a non-zero exit code.

use phasewall::Phasewall;
use phasewall::args::{CliAction, ParsedArgs};
use phasewall::commands;
use phasewall::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use phasewall::config;
use phasewall::log_error_exit;

fn run() -> anyhow::Result<()> {
    let parsed_args = ParsedArgs::from_env();

    // Applies to every action that loads the configuration
    let config_dir = match &parsed_args.action {
        CliAction::Run { config_dir, .. }
        | CliAction::Now { config_dir, .. }
        | CliAction::Reload { config_dir, .. }
        | CliAction::Simulate { config_dir, .. } => config_dir.clone(),
        _ => None,
    };
    config::set_config_dir(config_dir)?;

    match parsed_args.action {
        CliAction::ShowVersion => {
            commands::help::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            commands::help::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            commands::help::show_usage();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run { debug_enabled, .. } => Phasewall::new(debug_enabled).run(),
        CliAction::Now {
            debug_enabled,
            city,
            ..
        } => commands::now::handle_now_command(city.as_deref(), debug_enabled),
        CliAction::Reload { debug_enabled, .. } => {
            commands::reload::handle_reload_command(debug_enabled)
        }
        CliAction::Simulate {
            debug_enabled,
            start_time,
            end_time,
            multiplier,
            log_to_file,
            ..
        } => commands::simulate::handle_simulate_command(
            &start_time,
            &end_time,
            multiplier,
            log_to_file,
            debug_enabled,
        ),
    }
}

fn main() {
    match run() {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            log_error_exit!("{e:#}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}
