// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `mutations.json` queue: a JSON array any number of writers (CLI
//! invocations, the agent itself via the webhook side-channel) append to,
//! and the Daemon Loop drains once per tick.
//!
//! Lock discipline mirrors the PID-lock pattern the teacher's lifecycle
//! startup uses: a non-blocking exclusive `fs2` lock. The reader never
//! blocks waiting for it — if another writer holds the lock this tick, the
//! drain is simply skipped and retried next tick.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use fs2::FileExt;
use pulse_core::MutationCommand;

use crate::error::StorageError;

pub struct MutationQueue {
    path: PathBuf,
}

impl MutationQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Drain all pending commands, truncating the queue file back to `[]`.
    ///
    /// Returns `Ok(None)` if the exclusive lock could not be acquired
    /// without blocking — callers should treat that as "skip this tick",
    /// not an error.
    pub fn drain(&self) -> Result<Option<Vec<MutationCommand>>, StorageError> {
        if !self.path.exists() {
            return Ok(Some(Vec::new()));
        }

        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        if file.try_lock_exclusive().is_err() {
            return Ok(None);
        }

        let mut content = String::new();
        file.read_to_string(&mut content)?;
        let commands = parse_commands(&content);

        file.seek(SeekFrom::Start(0))?;
        file.write_all(b"[]")?;
        file.set_len(2)?;
        FileExt::unlock(&file)?;

        Ok(Some(commands))
    }

    /// Append one command to the queue. Used by the CLI and by the webhook
    /// feedback channel; safe under concurrent callers since the whole
    /// read-modify-write happens under the same exclusive lock.
    pub fn enqueue(&self, command: MutationCommand) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().read(true).write(true).create(true).open(&self.path)?;
        file.lock_exclusive()?;

        let result = (|| -> Result<(), StorageError> {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            let mut commands = parse_commands(&content);
            commands.push(command);
            let json = serde_json::to_string(&commands)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(json.as_bytes())?;
            file.set_len(json.len() as u64)?;
            Ok(())
        })();

        FileExt::unlock(&file)?;
        result
    }
}

fn parse_commands(content: &str) -> Vec<MutationCommand> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(content) {
        Ok(commands) => commands,
        Err(err) => {
            tracing::warn!(error = %err, "mutation queue contained malformed JSON, treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "mutation_queue_tests.rs"]
mod tests;
