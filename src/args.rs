//! Command-line argument parsing.
//!
//! Turns `std::env::args()` into a [`CliAction`]. Global flags (`--debug`,
//! `--config <dir>`) may appear anywhere; the first bare word selects a
//! subcommand. Unknown flags or malformed subcommand arguments fall back to
//! showing help.

use crate::common::constants::DEFAULT_SIMULATION_MULTIPLIER;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the wallpaper daemon
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Print the current phase and today's solar times once
    Now {
        debug_enabled: bool,
        city: Option<String>,
        config_dir: Option<String>,
    },
    /// Ask the running daemon to reload its configuration
    Reload {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Run the scheduler on simulated time
    Simulate {
        debug_enabled: bool,
        start_time: String,
        end_time: String,
        /// Simulated seconds per real second; 0 fast-forwards
        multiplier: f64,
        log_to_file: bool,
        config_dir: Option<String>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Loose shape check for "YYYY-MM-DD HH:MM:SS"; full parsing happens later.
fn looks_like_datetime(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 19
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b' '
        && bytes[13] == b':'
        && bytes[16] == b':'
}

fn parse_simulate(words: &[String], debug_enabled: bool, config_dir: Option<String>) -> CliAction {
    let [start, end, rest @ ..] = words else {
        log_warning!(
            "Missing arguments for simulate. Usage: simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\" [multiplier | --fast-forward] [--log]"
        );
        return CliAction::ShowHelpDueToError;
    };

    for (label, value) in [("start", start), ("end", end)] {
        if !looks_like_datetime(value) {
            log_error!("Invalid {label} time format: '{value}'. Use YYYY-MM-DD HH:MM:SS");
            return CliAction::ShowHelpDueToError;
        }
    }

    let mut multiplier = DEFAULT_SIMULATION_MULTIPLIER;
    let mut log_to_file = false;

    for word in rest {
        match word.as_str() {
            "--fast-forward" => multiplier = 0.0,
            "--log" => log_to_file = true,
            other => match other.parse::<f64>() {
                Ok(value) if (0.1..=3600.0).contains(&value) => multiplier = value,
                Ok(value) => {
                    log_error!("Invalid multiplier: {value}. Must be between 0.1 and 3600.");
                    return CliAction::ShowHelpDueToError;
                }
                Err(_) => {
                    log_error!("Unexpected argument for simulate: '{other}'");
                    return CliAction::ShowHelpDueToError;
                }
            },
        }
    }

    CliAction::Simulate {
        debug_enabled,
        start_time: start.clone(),
        end_time: end.clone(),
        multiplier,
        log_to_file,
        config_dir,
    }
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first element is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;
        let mut config_dir: Option<String> = None;
        // Subcommand name followed by its positional arguments
        let mut words: Vec<String> = Vec::new();

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut iter = args_vec.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug" | "-d" => debug_enabled = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--config" | "-c" => match iter.next() {
                    Some(dir) => config_dir = Some(dir),
                    None => {
                        log_warning!("Missing directory for --config");
                        unknown_arg_found = true;
                    }
                },
                // Subcommand-specific flags are validated by the subcommand
                "--log" | "--fast-forward" => words.push(arg),
                flag if flag.starts_with('-') && flag.parse::<f64>().is_err() => {
                    log_warning!("Unknown argument: {flag}");
                    unknown_arg_found = true;
                }
                _ => words.push(arg),
            }
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if display_help {
            CliAction::ShowHelp
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else {
            match words.split_first() {
                None => CliAction::Run {
                    debug_enabled,
                    config_dir,
                },
                Some((command, rest)) => match command.as_str() {
                    "now" | "n" => {
                        let city = rest.join(" ");
                        let city = city.trim();
                        CliAction::Now {
                            debug_enabled,
                            city: (!city.is_empty()).then(|| city.to_string()),
                            config_dir,
                        }
                    }
                    "reload" | "r" if rest.is_empty() => CliAction::Reload {
                        debug_enabled,
                        config_dir,
                    },
                    "simulate" | "S" => parse_simulate(rest, debug_enabled, config_dir),
                    other => {
                        log_warning!("Unknown command: {other}");
                        CliAction::ShowHelpDueToError
                    }
                },
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}
