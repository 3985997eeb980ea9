// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Evaluator: a single `evaluate` contract behind two interchangeable
//! strategies, selected once at startup from `evaluator.mode` — a tagged
//! enum rather than a trait object, per the REDESIGN FLAGS.

mod model;
mod rules;

use pulse_config::EvaluatorConfig;
use pulse_core::{Clock, DriveState, SensorData, TriggerDecision};
use pulse_storage::TriggerHistoryEntry;

pub use model::ModelEvaluator;
pub use rules::RulesEvaluator;

pub enum Evaluator<C: Clock> {
    Rules(RulesEvaluator),
    Model(ModelEvaluator<C>),
}

impl<C: Clock> Evaluator<C> {
    pub fn new(config: &EvaluatorConfig, clock: C) -> Self {
        match config.mode.as_str() {
            "model" => Evaluator::Model(ModelEvaluator::new(config.model.clone(), clock)),
            _ => Evaluator::Rules(RulesEvaluator::new(config.rules.clone())),
        }
    }

    pub async fn evaluate(
        &mut self,
        drive_state: &DriveState,
        sensor_data: &SensorData,
        working_memory: Option<&serde_json::Value>,
        config: &EvaluatorConfig,
        trigger_threshold: f64,
    ) -> TriggerDecision {
        match self {
            Evaluator::Rules(rules) => rules.evaluate(drive_state, sensor_data, trigger_threshold),
            Evaluator::Model(model) => {
                model.evaluate(drive_state, sensor_data, working_memory, &config.rules, trigger_threshold).await
            }
        }
    }

    /// Feeds the Model evaluator's bounded presentation-only trigger-history
    /// ring buffer; a no-op for the Rules strategy.
    pub fn record_trigger_history(&mut self, entry: TriggerHistoryEntry) {
        if let Evaluator::Model(model) = self {
            model.record_trigger_history(entry);
        }
    }

    /// Read-only diagnostics for the Health Surface's `GET /status` — which
    /// strategy is active, and (for the model strategy) whether it is
    /// currently degraded to the rules fallback.
    pub fn status(&self) -> EvaluatorStatus {
        match self {
            Evaluator::Rules(_) => EvaluatorStatus { mode: "rules".to_string(), consecutive_failures: 0, suppressed_until: 0 },
            Evaluator::Model(model) => EvaluatorStatus {
                mode: "model".to_string(),
                consecutive_failures: model.consecutive_failures(),
                suppressed_until: model.suppressed_until(),
            },
        }
    }
}

/// Snapshot of evaluator health, serialized verbatim into `GET /status`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EvaluatorStatus {
    pub mode: String,
    pub consecutive_failures: u32,
    pub suppressed_until: u64,
}
