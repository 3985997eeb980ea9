// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only `trigger-history.jsonl`: one line per dispatch attempt,
//! written by the Daemon Loop's sole State Store owner — no locking needed,
//! this is a single-writer log.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerHistoryEntry {
    pub ts: u64,
    pub outcome: String,
    pub reason: String,
    pub top_drive: Option<String>,
    pub total_pressure: f64,
}

pub struct TriggerHistoryLog {
    path: PathBuf,
}

impl TriggerHistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, entry: &TriggerHistoryEntry) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Most recent `n` entries, newest-last.
    pub fn recent(&self, n: usize) -> Result<Vec<TriggerHistoryEntry>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut entries = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::warn!(error = %err, "skipping malformed trigger-history line"),
            }
        }
        let start = entries.len().saturating_sub(n);
        Ok(entries.split_off(start))
    }
}

#[cfg(test)]
#[path = "trigger_history_tests.rs"]
mod tests;
