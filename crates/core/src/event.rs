// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast events: the append-only, line-delimited stream every subsystem
//! writes timestamped notes into.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of the broadcast log.
///
/// Readers filter by `source`/`type`/`ts`; writers never coordinate with
/// each other beyond the append-time advisory lock, so `ts` ordering across
/// distinct writers is not guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastEvent {
    pub ts: u64,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub salience: f64,
    #[serde(default)]
    pub data: Value,
}

impl BroadcastEvent {
    pub fn new(ts: u64, source: impl Into<String>, kind: impl Into<String>, salience: f64) -> Self {
        Self { ts, source: source.into(), kind: kind.into(), salience: salience.clamp(0.0, 1.0), data: Value::Null }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// In-process event kinds the Daemon Loop emits on its internal event bus
/// (distinct from the on-disk [`BroadcastEvent`] stream).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalEventKind {
    TriggerSuccess,
    TriggerFailure,
    MutationApplied,
}

crate::simple_display! {
    InternalEventKind {
        TriggerSuccess => "trigger_success",
        TriggerFailure => "trigger_failure",
        MutationApplied => "mutation_applied",
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
