// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger decisions produced by the Evaluator.

use serde::{Deserialize, Serialize};

/// The Evaluator's verdict for a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDecision {
    pub should_trigger: bool,
    pub reason: String,
    pub total_pressure: f64,
    pub top_drive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_context: Option<String>,
    #[serde(default)]
    pub recommend_generate: bool,
}

impl TriggerDecision {
    pub fn no_trigger(reason: impl Into<String>, total_pressure: f64, top_drive: Option<String>) -> Self {
        Self {
            should_trigger: false,
            reason: reason.into(),
            total_pressure,
            top_drive,
            sensor_context: None,
            recommend_generate: false,
        }
    }

    pub fn trigger(reason: impl Into<String>, total_pressure: f64, top_drive: Option<String>) -> Self {
        Self {
            should_trigger: true,
            reason: reason.into(),
            total_pressure,
            top_drive,
            sensor_context: None,
            recommend_generate: false,
        }
    }

    pub fn with_sensor_context(mut self, context: impl Into<String>) -> Self {
        self.sensor_context = Some(context.into());
        self
    }

    pub fn recommending_generate(mut self) -> Self {
        self.recommend_generate = true;
        self
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
