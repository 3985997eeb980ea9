// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only `mutations.jsonl` audit log, one `MutationRecord` per applied
//! or blocked mutation attempt. Single-writer (the Daemon Loop's Mutator),
//! same as [`crate::trigger_history`].

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use pulse_core::MutationRecord;

use crate::error::StorageError;

#[derive(Clone)]
pub struct MutationLog {
    path: PathBuf,
}

impl MutationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, record: &MutationRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Most recent `n` records, newest-last — backs the `GET /mutations?n=`
    /// health-surface endpoint.
    pub fn recent(&self, n: usize) -> Result<Vec<MutationRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(err) => tracing::warn!(error = %err, "skipping malformed mutation-log line"),
            }
        }
        let start = records.len().saturating_sub(n);
        Ok(records.split_off(start))
    }
}

#[cfg(test)]
#[path = "mutation_log_tests.rs"]
mod tests;
