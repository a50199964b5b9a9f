//! Signal handling for the phasewall daemon.
//!
//! A dedicated thread turns POSIX signals into [`SignalMessage`]s on the same
//! channel the config watcher uses, so the scheduler sees every external event
//! in one queue and in arrival order:
//!
//! - `SIGINT`, `SIGTERM`, `SIGHUP`: shut down
//! - `SIGUSR2`: reload the configuration (sent by `phasewall reload`)
//! - `SIGUSR1`: re-run the refresh pass immediately

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2},
    iterator::Signals,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

/// Messages delivered to the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Stop the loop and exit (SIGINT, SIGTERM, SIGHUP)
    Shutdown,
    /// Re-read the configuration file (SIGUSR2, file watcher)
    Reload,
    /// Run a refresh pass now (SIGUSR1)
    Refresh,
}

impl SignalMessage {
    /// Map a raw signal number to its message.
    pub fn from_signal(signal: i32) -> Option<Self> {
        match signal {
            SIGINT | SIGTERM | SIGHUP => Some(Self::Shutdown),
            SIGUSR2 => Some(Self::Reload),
            SIGUSR1 => Some(Self::Refresh),
            _ => None,
        }
    }
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Cleared when a shutdown signal arrives
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Kept so other producers (the config watcher) can join the channel
    pub signal_sender: Sender<SignalMessage>,
}

/// Register signal handlers and spawn the forwarding thread.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = channel::<SignalMessage>();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = running.clone();
    let sender = signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            let Some(message) = SignalMessage::from_signal(sig) else {
                continue;
            };

            if debug_enabled {
                log_pipe!();
                log_debug!("Received signal {sig} ({message:?})");
            }

            if message == SignalMessage::Shutdown {
                running_clone.store(false, Ordering::SeqCst);
            }

            if sender.send(message).is_err() {
                break;
            }
        }
    });

    Ok(SignalState {
        running,
        signal_receiver,
        signal_sender,
    })
}
