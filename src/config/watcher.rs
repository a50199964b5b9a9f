//! Hot reload of the configuration file.
//!
//! Watches the directory containing `phasewall.toml` (editors usually replace
//! the file rather than write it in place) and sends [`SignalMessage::Reload`]
//! once events for the config file have gone quiet for
//! [`CONFIG_WATCH_DEBOUNCE_MS`].

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::common::constants::CONFIG_WATCH_DEBOUNCE_MS;
use crate::common::utils::private_path;
use crate::io::signals::SignalMessage;

/// Whether `event` touches the file named `file_name`.
fn affects_config(event: &Event, file_name: &OsStr) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|path| path.file_name() == Some(file_name))
}

/// Block until a relevant event arrives, then until events stop for `quiet`.
///
/// Returns false when the watcher side of the channel is gone.
fn wait_for_change(events: &Receiver<Event>, file_name: &OsStr, quiet: Duration) -> bool {
    loop {
        match events.recv() {
            Ok(event) if affects_config(&event, file_name) => break,
            Ok(_) => continue,
            Err(_) => return false,
        }
    }

    loop {
        if let Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) =
            events.recv_timeout(quiet)
        {
            return true;
        }
    }
}

/// Start watching `config_path` on a background thread.
pub fn start_config_watcher(
    config_path: &Path,
    signal_sender: Sender<SignalMessage>,
    debug_enabled: bool,
) -> Result<()> {
    let watch_dir: PathBuf = config_path
        .parent()
        .context("Config path has no parent directory")?
        .to_path_buf();
    let file_name = config_path
        .file_name()
        .context("Config path has no file name")?
        .to_os_string();

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        NotifyConfig::default(),
    )
    .context("Failed to create file watcher")?;

    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch directory: {}", private_path(&watch_dir)))?;

    if debug_enabled {
        log_pipe!();
        log_debug!("Watching {} for changes", private_path(config_path));
    }

    thread::spawn(move || {
        // The watcher stops when dropped, so it lives as long as this thread
        let _watcher = watcher;
        let quiet = Duration::from_millis(CONFIG_WATCH_DEBOUNCE_MS);

        while wait_for_change(&rx, &file_name, quiet) {
            if debug_enabled {
                log_pipe!();
                log_info!("Configuration file change detected");
            }
            if signal_sender.send(SignalMessage::Reload).is_err() {
                break;
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};
    use std::sync::mpsc;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_only_config_file_events_count() {
        let name = OsStr::new("phasewall.toml");

        assert!(affects_config(
            &event(EventKind::Modify(ModifyKind::Any), "/cfg/phasewall.toml"),
            name
        ));
        assert!(!affects_config(
            &event(EventKind::Create(CreateKind::File), "/cfg/other.toml"),
            name
        ));
        assert!(!affects_config(
            &event(EventKind::Access(notify::event::AccessKind::Any), "/cfg/phasewall.toml"),
            name
        ));
    }

    #[test]
    fn test_burst_of_events_is_one_change() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..5 {
            tx.send(event(EventKind::Modify(ModifyKind::Any), "/cfg/phasewall.toml"))
                .unwrap();
        }

        assert!(wait_for_change(
            &rx,
            OsStr::new("phasewall.toml"),
            Duration::from_millis(20)
        ));
        assert!(rx.try_recv().is_err());

        drop(tx);
        assert!(!wait_for_change(
            &rx,
            OsStr::new("phasewall.toml"),
            Duration::from_millis(20)
        ));
    }
}
