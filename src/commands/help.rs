//! Help and version output.

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays the general help message.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("phasewall [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>        Use custom configuration directory");
    log_indented!("-d, --debug               Enable detailed debug output");
    log_indented!("-h, --help                Print help information");
    log_indented!("-V, --version             Print version information");
    log_block_start!("Commands:");
    log_indented!("(none)                    Run the wallpaper daemon");
    log_indented!("now, n [CITY]             Show the current phase and today's solar times");
    log_indented!("reload, r                 Make the running daemon reload its configuration");
    log_indented!("simulate, S <start> <end> [multiplier | --fast-forward] [--log]");
    log_indented!("                          Run the scheduler on simulated time");
    log_block_start!("Signals:");
    log_indented!("SIGUSR1                   Re-check the phase immediately");
    log_indented!("SIGUSR2                   Reload the configuration");
    log_end!();
}

/// Show brief usage after a parse error.
pub fn show_usage() {
    log_block_start!("Usage: phasewall [OPTIONS] [COMMAND]");
    log_pipe!();
    log_info!("Try 'phasewall --help' for more information.");
    log_end!();
}
