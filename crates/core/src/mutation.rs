// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutation commands: the agent's self-modification interface, and the
//! audit trail every applied or blocked command leaves behind.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A self-modification command read from the mutation queue.
///
/// Tagged by `type` to match the wire format the queue file uses; each
/// variant's required fields are exactly the ones the Mutator validates
/// before dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MutationCommand {
    AdjustWeight {
        drive: String,
        value: f64,
        #[serde(default = "default_reason")]
        reason: String,
    },
    AdjustThreshold {
        value: f64,
        #[serde(default = "default_reason")]
        reason: String,
    },
    AdjustRate {
        value: f64,
        #[serde(default = "default_reason")]
        reason: String,
    },
    AdjustCooldown {
        value: i64,
        #[serde(default = "default_reason")]
        reason: String,
    },
    AdjustTurnsPerHour {
        value: i64,
        #[serde(default = "default_reason")]
        reason: String,
    },
    AddDrive {
        name: String,
        #[serde(default = "default_drive_weight")]
        weight: f64,
        #[serde(default = "default_reason")]
        reason: String,
    },
    RemoveDrive {
        drive: String,
        #[serde(default = "default_reason")]
        reason: String,
    },
    SpikeDrive {
        drive: String,
        #[serde(default = "default_mutation_amount")]
        amount: f64,
        #[serde(default = "default_reason")]
        reason: String,
    },
    DecayDrive {
        drive: String,
        #[serde(default = "default_mutation_amount")]
        amount: f64,
        #[serde(default = "default_reason")]
        reason: String,
    },
}

fn default_reason() -> String {
    "no reason given".to_string()
}

/// Default weight assigned to a drive created via `add_drive` with no
/// explicit weight, per `original_source`'s `_add_drive`.
fn default_drive_weight() -> f64 {
    0.5
}

/// Default amount for `spike_drive`/`decay_drive` when the agent omits one,
/// per `original_source`'s `_spike_drive`/`_decay_drive`.
fn default_mutation_amount() -> f64 {
    0.3
}

impl MutationCommand {
    /// The `type` discriminant, for logging and audit target paths.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AdjustWeight { .. } => "adjust_weight",
            Self::AdjustThreshold { .. } => "adjust_threshold",
            Self::AdjustRate { .. } => "adjust_rate",
            Self::AdjustCooldown { .. } => "adjust_cooldown",
            Self::AdjustTurnsPerHour { .. } => "adjust_turns_per_hour",
            Self::AddDrive { .. } => "add_drive",
            Self::RemoveDrive { .. } => "remove_drive",
            Self::SpikeDrive { .. } => "spike_drive",
            Self::DecayDrive { .. } => "decay_drive",
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::AdjustWeight { reason, .. }
            | Self::AdjustThreshold { reason, .. }
            | Self::AdjustRate { reason, .. }
            | Self::AdjustCooldown { reason, .. }
            | Self::AdjustTurnsPerHour { reason, .. }
            | Self::AddDrive { reason, .. }
            | Self::RemoveDrive { reason, .. }
            | Self::SpikeDrive { reason, .. }
            | Self::DecayDrive { reason, .. } => reason,
        }
    }
}

/// Outcome of applying one [`MutationCommand`], replacing exception-driven
/// control flow with an explicit tri-state result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MutationOutcome {
    Applied { kind: String, before: Value, after: Value, clamped: bool },
    Blocked { kind: String, error: String },
    Error { kind: String, error: String },
}

impl MutationOutcome {
    pub fn kind(&self) -> &str {
        match self {
            Self::Applied { kind, .. } | Self::Blocked { kind, .. } | Self::Error { kind, .. } => kind,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// One append-only audit entry: a record of a mutation attempt, applied or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationRecord {
    pub ts: u64,
    pub mutation_type: String,
    pub target: String,
    pub before: Value,
    pub after: Value,
    pub reason: String,
    #[serde(default)]
    pub clamped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamped_from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl MutationRecord {
    pub fn new(
        ts: u64,
        mutation_type: impl Into<String>,
        target: impl Into<String>,
        before: Value,
        after: Value,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            ts,
            mutation_type: mutation_type.into(),
            target: target.into(),
            before,
            after,
            reason: reason.into(),
            clamped: false,
            clamped_from: None,
            source: None,
        }
    }

    pub fn clamped_from(mut self, proposed: Value) -> Self {
        self.clamped = true;
        self.clamped_from = Some(proposed);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
