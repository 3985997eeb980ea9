// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feedback messages: how the hosting agent reports back on a triggered turn.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coarse outcome of an agent turn, reported via either feedback channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackOutcome {
    Success,
    Partial,
    Blocked,
}

impl FeedbackOutcome {
    /// Fraction of current pressure to decay when no explicit
    /// `decay_overrides` entry is present for a drive, per spec.
    pub fn default_decay_fraction(self) -> f64 {
        match self {
            Self::Success => 0.7,
            Self::Partial => 0.4,
            Self::Blocked => 0.0,
        }
    }
}

/// A feedback report, arriving either as a dropped `turn_result.json` file
/// or a `POST /feedback` body — both funnel into the same handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub drives_addressed: Vec<String>,
    pub outcome: FeedbackOutcome,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub decay_overrides: HashMap<String, f64>,
}

/// Per-drive outcome returned from applying a [`FeedbackMessage`], echoed
/// back in the `POST /feedback` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveDecayResult {
    pub before: f64,
    pub after: f64,
    pub decayed: f64,
}

#[cfg(test)]
#[path = "feedback_tests.rs"]
mod tests;
