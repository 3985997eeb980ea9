// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::ConfigError;
use crate::model::PulseConfig;

/// Validate a fully loaded config, mirroring the original's `_validate`.
/// Collects every violation instead of failing on the first so a fresh
/// install reports all of its config mistakes at once.
pub fn validate(config: &PulseConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.webhook.token.is_empty() {
        tracing::warn!("no webhook token configured — webhook calls will be unauthenticated");
    }
    if config.drives.pressure_rate <= 0.0 {
        errors.push("drives.pressure_rate must be positive".to_string());
    }
    if config.drives.max_pressure <= 0.0 {
        errors.push("drives.max_pressure must be positive".to_string());
    }
    if config.drives.trigger_threshold <= 0.0 {
        errors.push("drives.trigger_threshold must be positive".to_string());
    }
    if config.drives.success_decay < 0.0 {
        errors.push("drives.success_decay must be non-negative".to_string());
    }
    if config.daemon.loop_interval_seconds < 1 {
        errors.push("daemon.loop_interval_seconds must be >= 1".to_string());
    }
    if config.daemon.health_port == 0 {
        errors.push("daemon.health_port must be 1-65535".to_string());
    }
    if config.webhook.max_turns_per_hour < 1 {
        errors.push("webhook.max_turns_per_hour must be >= 1".to_string());
    }
    if config.evaluator.mode != "rules" && config.evaluator.mode != "model" {
        errors.push(format!("evaluator.mode must be 'rules' or 'model', got '{}'", config.evaluator.mode));
    }
    if config.state.history_retention_days < 1 {
        errors.push("state.history_retention_days must be >= 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n")))
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
