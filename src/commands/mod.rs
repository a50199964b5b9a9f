//! Command-line command handlers.
//!
//! The daemon itself lives in [`crate::Phasewall`]; these are the one-shot
//! commands around it. Each command is implemented in its own submodule.

pub mod help;
pub mod now;
pub mod reload;
pub mod simulate;
