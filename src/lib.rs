//! # Phasewall Library
//!
//! Internal library for the phasewall binary.
//!
//! This library exists to enable testing of the scheduling internals and to keep a clean
//! separation between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Phasewall` struct wires configuration, signals and collaborators together
//! - **Core Logic**: `core` module holds the phase classifier, the debouncer and the scheduler loop
//! - **Geographic**: `geo` module with the city resolver, solar time provider, daily cache and
//!   retry wrapper
//! - **Rendering**: `render` module with the surfaces that actually swap the wallpaper
//! - **Configuration**: `config` module for TOML-based settings with hot-reload
//! - **Commands**: `commands` module for CLI subcommands (now, reload, simulate)
//! - **Infrastructure**: signal handling, lock file, logging and the time source abstraction

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod geo;
pub mod io;
pub mod render;
pub mod time_source;

#[cfg(any(test, feature = "testing-support"))]
pub mod testing;

mod phasewall;

pub use crate::core::phase::{Phase, classify};
pub use error::PhaseError;
pub use phasewall::Phasewall;
