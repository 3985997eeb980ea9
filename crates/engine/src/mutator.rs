// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Mutator: drains the mutation queue and applies bounded changes to
//! live drives and configuration, routing every command through
//! [`Guardrails`] and recording the outcome via [`pulse_storage::MutationLog`].
//! `spike_drive` additionally clamps against the configured `max_pressure`
//! directly (not via `Guardrails`) since it's a hard physical bound on
//! `Drive::pressure`, not a rate-limited policy knob.

use pulse_core::{Clock, Drive, MutationCommand, MutationOutcome, MutationRecord};
use pulse_storage::MutationLog;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::drive_engine::DriveEngine;
use crate::error::EngineError;
use crate::guardrails::Guardrails;

/// Runtime overrides applied on top of the static config, produced by
/// `adjust_threshold`/`adjust_rate`/`adjust_cooldown`/`adjust_turns_per_hour`
/// mutations. Persisted under `config_overrides` in the state snapshot
/// (spec.md §4.7) and re-applied by the Daemon Loop before it starts ticking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_trigger_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_turns_per_hour: Option<i64>,
}

pub struct Mutator<C: Clock> {
    guardrails: Guardrails<C>,
    log: MutationLog,
    clock: C,
    max_pressure: f64,
}

impl<C: Clock> Mutator<C> {
    pub fn new(guardrails: Guardrails<C>, log: MutationLog, clock: C, max_pressure: f64) -> Self {
        Self { guardrails, log, clock, max_pressure }
    }

    /// Apply one batch of drained commands, returning one outcome per
    /// command in order. Never returns `Err` for per-command failures —
    /// those become `MutationOutcome::Blocked`/`Error` — `Err` is reserved
    /// for the audit-log append itself failing.
    pub fn apply_batch(
        &mut self,
        commands: Vec<MutationCommand>,
        drive_engine: &mut DriveEngine<C>,
        overrides: &mut ConfigOverrides,
    ) -> Result<Vec<MutationOutcome>, EngineError> {
        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            let outcome = self.apply_one(&command, drive_engine, overrides)?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn apply_one(
        &mut self,
        command: &MutationCommand,
        drive_engine: &mut DriveEngine<C>,
        overrides: &mut ConfigOverrides,
    ) -> Result<MutationOutcome, EngineError> {
        let kind = command.kind().to_string();
        if let Err(err) = self.guardrails.check_mutation_rate() {
            let outcome = MutationOutcome::Blocked { kind: kind.clone(), error: err.to_string() };
            self.record(&kind, &kind, json!(null), json!(null), command.reason(), false, None)?;
            return Ok(outcome);
        }

        let outcome = match command {
            MutationCommand::AdjustWeight { drive, value, reason } => {
                self.adjust_weight(drive, *value, reason, drive_engine)?
            }
            MutationCommand::AdjustThreshold { value, reason } => self.adjust_threshold(*value, reason, overrides)?,
            MutationCommand::AdjustRate { value, reason } => self.adjust_rate(*value, reason, overrides)?,
            MutationCommand::AdjustCooldown { value, reason } => self.adjust_cooldown(*value, reason, overrides)?,
            MutationCommand::AdjustTurnsPerHour { value, reason } => {
                self.adjust_turns_per_hour(*value, reason, overrides)?
            }
            MutationCommand::AddDrive { name, weight, reason } => self.add_drive(name, *weight, reason, drive_engine)?,
            MutationCommand::RemoveDrive { drive, reason } => self.remove_drive(drive, reason, drive_engine)?,
            MutationCommand::SpikeDrive { drive, amount, reason } => {
                self.spike_drive(drive, *amount, reason, drive_engine)?
            }
            MutationCommand::DecayDrive { drive, amount, reason } => {
                self.decay_drive(drive, *amount, reason, drive_engine)?
            }
        };
        Ok(outcome)
    }

    fn adjust_weight(
        &self,
        drive: &str,
        value: f64,
        reason: &str,
        drive_engine: &mut DriveEngine<C>,
    ) -> Result<MutationOutcome, EngineError> {
        let Some(current) = drive_engine.drive(drive).map(|d| d.weight) else {
            return Ok(MutationOutcome::Error { kind: "adjust_weight".into(), error: format!("unknown drive: {drive}") });
        };
        let result = self.guardrails.validate_weight_change(drive, current, value);
        drive_engine.drive_mut(drive).expect("checked above").weight = result.value;
        self.record(
            "adjust_weight",
            &format!("drives.{drive}.weight"),
            json!(current),
            json!(result.value),
            reason,
            result.clamped,
            result.clamped.then(|| json!(value)),
        )?;
        Ok(MutationOutcome::Applied {
            kind: "adjust_weight".into(),
            before: json!(current),
            after: json!(result.value),
            clamped: result.clamped,
        })
    }

    fn adjust_threshold(
        &self,
        value: f64,
        reason: &str,
        overrides: &mut ConfigOverrides,
    ) -> Result<MutationOutcome, EngineError> {
        let current = overrides.trigger_threshold.unwrap_or(value);
        let result = self.guardrails.validate_threshold_change(current, value);
        overrides.trigger_threshold = Some(result.value);
        self.record(
            "adjust_threshold",
            "drives.trigger_threshold",
            json!(current),
            json!(result.value),
            reason,
            result.clamped,
            result.clamped.then(|| json!(value)),
        )?;
        Ok(MutationOutcome::Applied {
            kind: "adjust_threshold".into(),
            before: json!(current),
            after: json!(result.value),
            clamped: result.clamped,
        })
    }

    fn adjust_rate(&self, value: f64, reason: &str, overrides: &mut ConfigOverrides) -> Result<MutationOutcome, EngineError> {
        let current = overrides.pressure_rate.unwrap_or(value);
        let result = self.guardrails.validate_rate_change(current, value);
        overrides.pressure_rate = Some(result.value);
        self.record(
            "adjust_rate",
            "drives.pressure_rate",
            json!(current),
            json!(result.value),
            reason,
            result.clamped,
            result.clamped.then(|| json!(value)),
        )?;
        Ok(MutationOutcome::Applied {
            kind: "adjust_rate".into(),
            before: json!(current),
            after: json!(result.value),
            clamped: result.clamped,
        })
    }

    fn adjust_cooldown(&self, value: i64, reason: &str, overrides: &mut ConfigOverrides) -> Result<MutationOutcome, EngineError> {
        let current = overrides.min_trigger_interval.unwrap_or(value);
        let result = self.guardrails.validate_cooldown(value);
        overrides.min_trigger_interval = Some(result.value);
        self.record(
            "adjust_cooldown",
            "webhook.min_trigger_interval",
            json!(current),
            json!(result.value),
            reason,
            result.clamped,
            result.clamped.then(|| json!(value)),
        )?;
        Ok(MutationOutcome::Applied {
            kind: "adjust_cooldown".into(),
            before: json!(current),
            after: json!(result.value),
            clamped: result.clamped,
        })
    }

    fn adjust_turns_per_hour(
        &self,
        value: i64,
        reason: &str,
        overrides: &mut ConfigOverrides,
    ) -> Result<MutationOutcome, EngineError> {
        let current = overrides.max_turns_per_hour.unwrap_or(value);
        let result = self.guardrails.validate_turns_per_hour(value);
        overrides.max_turns_per_hour = Some(result.value);
        self.record(
            "adjust_turns_per_hour",
            "webhook.max_turns_per_hour",
            json!(current),
            json!(result.value),
            reason,
            result.clamped,
            result.clamped.then(|| json!(value)),
        )?;
        Ok(MutationOutcome::Applied {
            kind: "adjust_turns_per_hour".into(),
            before: json!(current),
            after: json!(result.value),
            clamped: result.clamped,
        })
    }

    fn add_drive(
        &self,
        name: &str,
        weight: f64,
        reason: &str,
        drive_engine: &mut DriveEngine<C>,
    ) -> Result<MutationOutcome, EngineError> {
        let count = drive_engine.drives().count();
        if let Err(err) = self.guardrails.validate_drive_count(count) {
            self.record("add_drive", name, json!(null), json!(null), reason, false, None)?;
            return Ok(MutationOutcome::Blocked { kind: "add_drive".into(), error: err.to_string() });
        }
        if drive_engine.drive(name).is_some() {
            return Ok(MutationOutcome::Error { kind: "add_drive".into(), error: format!("drive already exists: {name}") });
        }
        drive_engine.set_drive(Drive::new(name, name, weight));
        self.record("add_drive", &format!("drives.{name}"), json!(null), json!({"weight": weight}), reason, false, None)?;
        Ok(MutationOutcome::Applied {
            kind: "add_drive".into(),
            before: json!(null),
            after: json!({"weight": weight}),
            clamped: false,
        })
    }

    fn remove_drive(&self, drive: &str, reason: &str, drive_engine: &mut DriveEngine<C>) -> Result<MutationOutcome, EngineError> {
        if let Err(err) = self.guardrails.validate_drive_removal(drive) {
            self.record("remove_drive", drive, json!(null), json!(null), reason, false, None)?;
            return Ok(MutationOutcome::Blocked { kind: "remove_drive".into(), error: err.to_string() });
        }
        let Some(removed) = drive_engine.remove_drive(drive) else {
            return Ok(MutationOutcome::Error { kind: "remove_drive".into(), error: format!("unknown drive: {drive}") });
        };
        self.record("remove_drive", &format!("drives.{drive}"), json!(removed), json!(null), reason, false, None)?;
        Ok(MutationOutcome::Applied {
            kind: "remove_drive".into(),
            before: json!(removed),
            after: json!(null),
            clamped: false,
        })
    }

    fn spike_drive(
        &self,
        drive: &str,
        amount: f64,
        reason: &str,
        drive_engine: &mut DriveEngine<C>,
    ) -> Result<MutationOutcome, EngineError> {
        let Some(before) = drive_engine.drive(drive).map(|d| d.pressure) else {
            return Ok(MutationOutcome::Error { kind: "spike_drive".into(), error: format!("unknown drive: {drive}") });
        };
        let d = drive_engine.drive_mut(drive).expect("checked above");
        d.spike(amount, self.max_pressure);
        let after = d.pressure;
        self.record("spike_drive", &format!("drives.{drive}.pressure"), json!(before), json!(after), reason, false, None)?;
        Ok(MutationOutcome::Applied { kind: "spike_drive".into(), before: json!(before), after: json!(after), clamped: false })
    }

    fn decay_drive(
        &self,
        drive: &str,
        amount: f64,
        reason: &str,
        drive_engine: &mut DriveEngine<C>,
    ) -> Result<MutationOutcome, EngineError> {
        let Some(before) = drive_engine.drive(drive).map(|d| d.pressure) else {
            return Ok(MutationOutcome::Error { kind: "decay_drive".into(), error: format!("unknown drive: {drive}") });
        };
        let d = drive_engine.drive_mut(drive).expect("checked above");
        d.decay(amount);
        let after = d.pressure;
        self.record("decay_drive", &format!("drives.{drive}.pressure"), json!(before), json!(after), reason, false, None)?;
        Ok(MutationOutcome::Applied { kind: "decay_drive".into(), before: json!(before), after: json!(after), clamped: false })
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        mutation_type: &str,
        target: &str,
        before: serde_json::Value,
        after: serde_json::Value,
        reason: &str,
        clamped: bool,
        clamped_from: Option<serde_json::Value>,
    ) -> Result<(), EngineError> {
        let mut record = MutationRecord::new(self.clock.epoch_secs(), mutation_type, target, before, after, reason);
        if clamped {
            record.clamped = true;
        }
        if let Some(proposed) = clamped_from {
            record = record.clamped_from(proposed);
        }
        self.log.append(&record)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mutator_tests.rs"]
mod tests;
