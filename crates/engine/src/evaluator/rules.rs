// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Rules evaluator: synchronous threshold comparison. The default
//! strategy, and the fallback the Model evaluator degrades to.

use pulse_config::RulesConfig;
use pulse_core::{ConversationReading, DriveState, SensorData, TriggerDecision};

pub struct RulesEvaluator {
    config: RulesConfig,
}

impl RulesEvaluator {
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    /// `trigger_threshold` comes from `DrivesConfig`, not `RulesConfig` — it
    /// gates `recommend_generate`, a DriveEngine-wide concept shared with the
    /// Model evaluator's fallback path.
    pub fn evaluate(&self, drive_state: &DriveState, sensor_data: &SensorData, trigger_threshold: f64) -> TriggerDecision {
        let conversation = read_conversation(sensor_data);

        if self.config.suppress_during_conversation && (conversation.active || conversation.in_cooldown) {
            return TriggerDecision::no_trigger(
                "conversation active or in cooldown",
                drive_state.total_pressure,
                drive_state.top_drive.clone(),
            );
        }

        if drive_state.top_weighted_pressure() >= self.config.single_drive_threshold {
            let top = drive_state.top_drive.clone();
            let name = top.clone().unwrap_or_default();
            return TriggerDecision::trigger(
                format!("{name} above single-drive threshold"),
                drive_state.total_pressure,
                top,
            );
        }

        if drive_state.total_pressure >= self.config.combined_threshold {
            return TriggerDecision::trigger(
                "combined pressure above threshold",
                drive_state.total_pressure,
                drive_state.top_drive.clone(),
            );
        }

        let mut decision =
            TriggerDecision::no_trigger("below threshold", drive_state.total_pressure, drive_state.top_drive.clone());
        if drive_state.total_pressure >= trigger_threshold {
            decision = decision.recommending_generate();
        }
        decision
    }
}

fn read_conversation(sensor_data: &SensorData) -> ConversationReading {
    sensor_data
        .get("conversation")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
