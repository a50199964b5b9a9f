//! Lock file management for single-instance enforcement.
//!
//! The daemon holds an exclusive `flock` on `$XDG_RUNTIME_DIR/phasewall.lock`
//! for its whole lifetime and writes its PID into it. The kernel drops the lock
//! when the process dies, so a leftover file never blocks a new instance. The
//! `reload` command reads the PID back to know whom to signal.

use anyhow::{Context, Result};
use fs2::FileExt;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::constants::LOCK_FILE_NAME;
use crate::common::utils::private_path;

/// An acquired lock. Released and removed on drop.
#[derive(Debug)]
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}

/// Default lock file location.
pub fn lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join(LOCK_FILE_NAME)
}

/// Acquire the lock at the default location.
pub fn acquire_lock() -> Result<LockFile> {
    acquire_lock_at(&lock_path())
}

/// Acquire an exclusive lock at `path` and record our PID in it.
pub fn acquire_lock_at(path: &Path) -> Result<LockFile> {
    // Open without truncating so a running instance's PID stays readable
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", private_path(path)))?;

    if file.try_lock_exclusive().is_err() {
        match read_pid(path) {
            Some(pid) => anyhow::bail!("phasewall is already running (PID {pid})"),
            None => anyhow::bail!(
                "phasewall is already running (lock held on {})",
                private_path(path)
            ),
        }
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    file.flush()?;

    Ok(LockFile {
        file,
        path: path.to_path_buf(),
    })
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path)
        .ok()?
        .lines()
        .next()?
        .trim()
        .parse()
        .ok()
}

fn process_alive(pid: u32) -> bool {
    i32::try_from(pid).is_ok_and(|raw| kill(Pid::from_raw(raw), None).is_ok())
}

/// PID of the running daemon, if the lock file names a live process.
pub fn running_pid() -> Option<u32> {
    running_pid_at(&lock_path())
}

pub fn running_pid_at(path: &Path) -> Option<u32> {
    read_pid(path).filter(|&pid| process_alive(pid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_lock_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let lock = acquire_lock_at(&path).unwrap();
        assert_eq!(running_pid_at(&path), Some(std::process::id()));

        let err = acquire_lock_at(&path).unwrap_err();
        assert!(err.to_string().contains("already running"));

        drop(lock);
        assert!(!path.exists());
        assert!(acquire_lock_at(&path).is_ok());
    }

    #[test]
    fn test_stale_pid_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        // PIDs above the kernel's pid_max never exist
        fs::write(&path, "99999999\n").unwrap();
        assert_eq!(running_pid_at(&path), None);

        fs::write(&path, "garbage\n").unwrap();
        assert_eq!(running_pid_at(&path), None);
    }
}
