// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sensor reading payloads: what `SensorManager::read()` fans back in.

use serde::{Deserialize, Serialize};

/// Kind of change observed by the filesystem sensor since the last read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A single filesystem change observed since the last read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FileChangeKind,
}

/// The filesystem sensor's per-tick payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilesystemReading {
    #[serde(default)]
    pub changes: Vec<FileChange>,
}

/// A single alert surfaced by the system sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// The system sensor's per-tick payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemReading {
    #[serde(default)]
    pub alerts: Vec<SystemAlert>,
}

/// The conversation sensor's per-tick payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationReading {
    pub active: bool,
    pub in_cooldown: bool,
    /// Unix epoch seconds of the last observed human activity, or `None` if
    /// no transcript has been seen yet.
    pub last_human_activity: Option<u64>,
    pub seconds_since: Option<u64>,
}

impl Default for ConversationReading {
    fn default() -> Self {
        Self { active: false, in_cooldown: false, last_human_activity: None, seconds_since: None }
    }
}

/// A combined tick reading: one entry per registered sensor, keyed by sensor
/// name. Readers must tolerate a sensor reporting `{"error": <msg>}` instead
/// of its normal payload shape.
pub type SensorData = std::collections::HashMap<String, serde_json::Value>;

/// Build the `{"error": msg}` payload a failed sensor reports in place of
/// its normal reading, so one misbehaving sensor cannot crash the fan-in.
pub fn error_payload(msg: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": msg.to_string() })
}

#[cfg(test)]
#[path = "sensor_tests.rs"]
mod tests;
