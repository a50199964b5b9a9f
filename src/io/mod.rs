//! Process-level plumbing: signal handling and the single-instance lock file.

pub mod lock;
pub mod signals;
