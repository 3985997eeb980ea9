// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Broadcast Bus: a line-delimited JSON file that any number of writers
//! append `BroadcastEvent`s to and any number of readers scan and filter.
//!
//! This is a log, not a queue — readers never consume, they just filter the
//! current contents. Appends take an exclusive advisory lock for the
//! duration of the write only; readers take no lock at all and tolerate a
//! line disappearing into an archive file mid-scan.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use pulse_core::BroadcastEvent;

use crate::error::StorageError;

/// Rotate once the live file exceeds this many lines.
const ROTATE_THRESHOLD: usize = 1000;
/// Lines kept in the live file after rotation.
const KEEP_LIVE: usize = 500;

/// Append-only, rotating, lock-guarded event log.
pub struct BroadcastBus {
    path: PathBuf,
}

impl BroadcastBus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one event, then rotate opportunistically if the file has
    /// grown past [`ROTATE_THRESHOLD`] lines.
    pub fn append(&self, event: &BroadcastEvent) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(event)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.lock_exclusive()?;
        let result = writeln!(file, "{line}").and_then(|_| file.flush());
        FileExt::unlock(&file)?;
        result?;

        self.maybe_rotate()
    }

    fn maybe_rotate(&self) -> Result<(), StorageError> {
        let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        file.lock_exclusive()?;
        let result = self.rotate_locked();
        FileExt::unlock(&file)?;
        result
    }

    fn rotate_locked(&self) -> Result<(), StorageError> {
        let content = fs::read_to_string(&self.path)?;
        let lines: Vec<&str> = content.lines().collect();
        if lines.len() <= ROTATE_THRESHOLD {
            return Ok(());
        }

        let split_at = lines.len() - KEEP_LIVE;
        let archive = lines[..split_at].join("\n") + "\n";
        let live = lines[split_at..].join("\n") + "\n";

        fs::write(self.archive_path(), archive)?;

        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, live)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn archive_path(&self) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
        let stem = self.path.file_stem().and_then(|s| s.to_str()).unwrap_or("broadcast");
        self.path.with_file_name(format!("{stem}-{stamp}.jsonl.bak"))
    }

    /// Most recent `n` events, newest-last.
    pub fn recent(&self, n: usize) -> Result<Vec<BroadcastEvent>, StorageError> {
        let all = self.read_all()?;
        let start = all.len().saturating_sub(n);
        Ok(all[start..].to_vec())
    }

    /// Events since (and including) `ts`, newest-last.
    pub fn since(&self, ts: u64) -> Result<Vec<BroadcastEvent>, StorageError> {
        Ok(self.read_all()?.into_iter().filter(|e| e.ts >= ts).collect())
    }

    /// Events whose `source` matches exactly, newest-last.
    pub fn by_source(&self, source: &str) -> Result<Vec<BroadcastEvent>, StorageError> {
        Ok(self.read_all()?.into_iter().filter(|e| e.source == source).collect())
    }

    /// Events whose `kind` matches exactly, newest-last.
    pub fn by_type(&self, kind: &str) -> Result<Vec<BroadcastEvent>, StorageError> {
        Ok(self.read_all()?.into_iter().filter(|e| e.kind == kind).collect())
    }

    fn read_all(&self) -> Result<Vec<BroadcastEvent>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut events = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(event) => events.push(event),
                Err(err) => tracing::warn!(error = %err, "skipping malformed broadcast line"),
            }
        }
        Ok(events)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;
