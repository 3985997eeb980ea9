// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance PID lock. Mirrors `original_source/src/core/daemon.py`'s
//! `_write_pid`: acquire an exclusive advisory lock on the PID file before
//! truncating it, so a crashed daemon's stale PID is never clobbered by a
//! second process that then fails to notice the first one is still alive.
//!
//! Liveness checks use `sysinfo` rather than sending a null signal, since the
//! workspace forbids `unsafe_code` and a raw `kill(pid, 0)` call requires it.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sysinfo::{Pid, System};
use tracing::warn;

use crate::error::DaemonError;

/// Holds the exclusive lock on `daemon.pid_file` for the process lifetime.
/// Released on `Drop`, which also removes the file.
pub struct PidLock {
    path: PathBuf,
    file: File,
}

impl PidLock {
    /// Acquire the lock, retrying once after clearing a stale PID left by a
    /// process that is no longer running.
    pub fn acquire(path: &Path) -> Result<Self, DaemonError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| DaemonError::Io { path: parent.to_path_buf(), source })?;
        }

        for attempt in 0..2 {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)
                .map_err(|source| DaemonError::Io { path: path.to_path_buf(), source })?;

            match file.try_lock_exclusive() {
                Ok(()) => {
                    let mut file = file;
                    file.set_len(0).map_err(|source| DaemonError::Io { path: path.to_path_buf(), source })?;
                    writeln!(file, "{}", std::process::id())
                        .map_err(|source| DaemonError::Io { path: path.to_path_buf(), source })?;
                    return Ok(Self { path: path.to_path_buf(), file });
                }
                Err(_) if attempt == 0 && stale_pid_file(path) => {
                    warn!(path = %path.display(), "removing stale pid file from a dead process");
                    let _ = std::fs::remove_file(path);
                }
                Err(_) => return Err(DaemonError::AlreadyRunning(path.to_path_buf())),
            }
        }
        Err(DaemonError::AlreadyRunning(path.to_path_buf()))
    }
}

impl Drop for PidLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Returns `true` if the PID file names a process that is no longer running.
fn stale_pid_file(path: &Path) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else { return false };
    let Ok(pid) = contents.trim().parse::<usize>() else { return false };

    let mut system = System::new_all();
    system.refresh_all();
    system.process(Pid::from(pid)).is_none()
}

#[cfg(test)]
#[path = "pid_lock_tests.rs"]
mod tests;
