// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detects whether a human is actively chatting with the agent, so the
//! Evaluator can suppress triggers mid-conversation. Grounded on
//! `original_source`'s `ConversationSensor`: it does not watch the agent's
//! wire protocol directly, it infers activity from the recency and size of
//! the main session transcript on disk.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use parking_lot::Mutex;
use pulse_core::{Clock, ConversationReading};
use serde_json::Value;

use crate::error::SensorError;
use crate::sensor::Sensor;

/// A `.jsonl` transcript smaller than this is assumed to be a hook, cron, or
/// sub-agent session rather than the main human conversation.
const MAIN_SESSION_MIN_BYTES: u64 = 100_000;
/// A transcript modified more recently than this is considered "active".
const ACTIVITY_WINDOW_SECS: u64 = 120;

pub struct ConversationSensor<C: Clock> {
    session_dirs: Vec<PathBuf>,
    cooldown_secs: u64,
    clock: C,
    last_human_activity: Mutex<Option<u64>>,
}

impl<C: Clock> ConversationSensor<C> {
    pub fn new(session_dirs: Vec<PathBuf>, cooldown_minutes: u64, clock: C) -> Self {
        Self { session_dirs, cooldown_secs: cooldown_minutes * 60, clock, last_human_activity: Mutex::new(None) }
    }

    /// Find the largest `.jsonl` transcript in a directory, ignoring probe
    /// files. Mirrors the original's "biggest file wins" heuristic for
    /// telling the main session apart from satellite sessions.
    fn largest_transcript(dir: &Path) -> Option<(PathBuf, u64)> {
        let entries = std::fs::read_dir(dir).ok()?;
        let mut largest: Option<(PathBuf, u64)> = None;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with("probe-") {
                continue;
            }
            let Ok(metadata) = entry.metadata() else { continue };
            if !metadata.is_file() {
                continue;
            }
            let size = metadata.len();
            if largest.as_ref().is_none_or(|(_, largest_size)| size > *largest_size) {
                largest = Some((path, size));
            }
        }
        largest
    }

    fn mtime_epoch_secs(path: &Path) -> Option<u64> {
        let modified = std::fs::metadata(path).ok()?.modified().ok()?;
        Some(modified.duration_since(SystemTime::UNIX_EPOCH).ok()?.as_secs())
    }
}

#[async_trait]
impl<C: Clock> Sensor for ConversationSensor<C> {
    fn name(&self) -> &str {
        "conversation"
    }

    async fn initialize(&mut self) -> Result<(), SensorError> {
        match self.session_dirs.iter().find(|dir| dir.exists()) {
            Some(dir) => tracing::info!(dir = %dir.display(), "conversation sensor watching session directory"),
            None => tracing::info!("conversation sensor: no session directory found, reporting inactive"),
        }
        Ok(())
    }

    async fn read(&mut self) -> Result<Value, SensorError> {
        let now = self.clock.epoch_secs();
        let mut active = false;
        let mut last_activity = *self.last_human_activity.lock();

        // Walk every existing candidate directory in order, stopping as soon
        // as one yields a qualifying transcript — matching the original's
        // `break`, which sits inside the "found a transcript over 100KB"
        // branch, not right after the directory-exists check. A directory
        // that exists but has nothing qualifying does not stop the search.
        for dir in self.session_dirs.iter().filter(|dir| dir.exists()) {
            if let Some((path, size)) = Self::largest_transcript(dir) {
                if size > MAIN_SESSION_MIN_BYTES {
                    if let Some(mtime) = Self::mtime_epoch_secs(&path) {
                        if now.saturating_sub(mtime) < ACTIVITY_WINDOW_SECS {
                            active = true;
                            last_activity = Some(last_activity.map_or(mtime, |prev| prev.max(mtime)));
                        }
                    }
                    break;
                }
            }
        }
        *self.last_human_activity.lock() = last_activity;

        let in_cooldown =
            last_activity.is_some_and(|ts| now.saturating_sub(ts) < self.cooldown_secs);
        let seconds_since = last_activity.map(|ts| now.saturating_sub(ts));

        let reading = ConversationReading {
            active,
            in_cooldown,
            last_human_activity: last_activity,
            seconds_since,
        };
        serde_json::to_value(reading).map_err(|err| SensorError::Read(err.to_string()))
    }
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
