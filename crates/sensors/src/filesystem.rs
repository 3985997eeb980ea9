// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS-level filesystem watcher, grounded on `original_source`'s
//! `_WatchdogHandler`/`FileSystemSensor` (Python `watchdog`): an event-driven
//! observer, not a poller, with a thread-safe dedup buffer and a one-shot
//! "self-write" suppression set so the daemon's own state writes never spike
//! its own drives.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use pulse_core::{FileChange, FileChangeKind, FilesystemReading};
use serde_json::Value;

use crate::error::SensorError;
use crate::sensor::Sensor;

/// A cloneable handle for marking paths the daemon itself just wrote, so
/// the next matching filesystem event is suppressed instead of spiking a
/// drive on the daemon's own activity.
#[derive(Clone, Default)]
pub struct FilesystemSensorHandle {
    self_write_paths: Arc<Mutex<HashSet<PathBuf>>>,
}

impl FilesystemSensorHandle {
    pub fn mark_self_write(&self, path: impl AsRef<Path>) {
        let resolved = path.as_ref().canonicalize().unwrap_or_else(|_| path.as_ref().to_path_buf());
        self.self_write_paths.lock().insert(resolved);
    }
}

pub struct FilesystemSensor {
    watch_paths: Vec<PathBuf>,
    ignore_patterns: Vec<String>,
    ignore_self_writes: bool,
    buffer: Arc<Mutex<HashMap<String, FileChange>>>,
    self_write_paths: Arc<Mutex<HashSet<PathBuf>>>,
    watcher: Option<RecommendedWatcher>,
}

impl FilesystemSensor {
    /// Build a sensor plus the handle used to mark self-writes. The handle
    /// is cheap to clone and meant to be handed to the State Store / Mutator.
    pub fn new(
        watch_paths: Vec<PathBuf>,
        ignore_patterns: Vec<String>,
        ignore_self_writes: bool,
    ) -> (Self, FilesystemSensorHandle) {
        let self_write_paths = Arc::new(Mutex::new(HashSet::new()));
        let handle = FilesystemSensorHandle { self_write_paths: Arc::clone(&self_write_paths) };
        let sensor = Self {
            watch_paths,
            ignore_patterns,
            ignore_self_writes,
            buffer: Arc::new(Mutex::new(HashMap::new())),
            self_write_paths,
            watcher: None,
        };
        (sensor, handle)
    }
}

fn classify(kind: &EventKind) -> Option<FileChangeKind> {
    match kind {
        EventKind::Create(_) => Some(FileChangeKind::Created),
        EventKind::Modify(_) => Some(FileChangeKind::Modified),
        EventKind::Remove(_) => Some(FileChangeKind::Deleted),
        _ => None,
    }
}

fn should_ignore(
    path: &Path,
    patterns: &[String],
    ignore_self_writes: bool,
    self_write_paths: &Mutex<HashSet<PathBuf>>,
) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let path_str = path.to_string_lossy();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(name) || glob_pattern.matches(&path_str) {
                    return true;
                }
            }
        } else if path_str.contains(pattern.as_str()) {
            return true;
        }
    }

    if ignore_self_writes {
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let mut self_write_paths = self_write_paths.lock();
        if self_write_paths.remove(&resolved) {
            return true;
        }
    }

    false
}

#[async_trait]
impl Sensor for FilesystemSensor {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn initialize(&mut self) -> Result<(), SensorError> {
        let buffer = Arc::clone(&self.buffer);
        let self_write_paths = Arc::clone(&self.self_write_paths);
        let ignore_patterns = self.ignore_patterns.clone();
        let ignore_self_writes = self.ignore_self_writes;

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else { return };
            let Some(kind) = classify(&event.kind) else { return };
            for path in &event.paths {
                if should_ignore(path, &ignore_patterns, ignore_self_writes, &self_write_paths) {
                    continue;
                }
                let change = FileChange { path: path.display().to_string(), kind };
                buffer.lock().insert(change.path.clone(), change);
            }
        })
        .map_err(|err| SensorError::Init(err.to_string()))?;

        let mut watched = 0;
        for path in &self.watch_paths {
            if path.exists() {
                watcher.watch(path, RecursiveMode::Recursive).map_err(|err| SensorError::Init(err.to_string()))?;
                watched += 1;
            } else {
                tracing::warn!(path = %path.display(), "filesystem sensor watch path does not exist");
            }
        }
        tracing::info!(watched, "filesystem sensor watching paths");
        self.watcher = Some(watcher);
        Ok(())
    }

    async fn read(&mut self) -> Result<Value, SensorError> {
        let changes: Vec<FileChange> = {
            let mut buffer = self.buffer.lock();
            std::mem::take(&mut *buffer).into_values().collect()
        };
        if !changes.is_empty() {
            tracing::debug!(count = changes.len(), "filesystem sensor changes detected");
        }
        serde_json::to_value(FilesystemReading { changes }).map_err(|err| SensorError::Read(err.to_string()))
    }

    async fn stop(&mut self) -> Result<(), SensorError> {
        self.watcher = None;
        tracing::info!("filesystem sensor stopped");
        Ok(())
    }
}

#[cfg(test)]
#[path = "filesystem_tests.rs"]
mod tests;
