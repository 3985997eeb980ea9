// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guardrails: bounds-checking for every mutation before it reaches live
//! state. `original_source/src/evolution/guardrails.py` was not present in
//! the retrieval pack — the limits below are synthesized from
//! `mutator.py`'s call sites (`validate_weight_change`,
//! `validate_threshold_change`, `validate_rate_change`, `validate_cooldown`,
//! `validate_turns_per_hour`, `validate_drive_count`,
//! `validate_drive_removal`, `check_mutation_rate`) and from
//! `plasticity.py`'s `EvolutionConfig` (`min_weight`, `max_weight`,
//! `protected_drives`, `protected_min_weight`), since both modules bound the
//! same weight domain. `max_weight_delta = 0.5` matches spec.md §8's S3
//! scenario exactly.

use std::collections::{HashSet, VecDeque};

use pulse_core::Clock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardrailError {
    #[error("mutation rate exceeded: more than {0} mutations in the last hour")]
    RateExceeded(u32),
    #[error("drive count ceiling reached: {0} drives already exist")]
    DriveCountExceeded(usize),
    #[error("drive '{0}' is protected and cannot be removed")]
    ProtectedDrive(String),
}

/// Bounds for every mutation kind. `original_source`'s `guardrails.py`
/// exposed these as a `limits` object; reconstructed here the same shape.
#[derive(Debug, Clone)]
pub struct GuardrailLimits {
    pub protected_drives: HashSet<String>,
    pub min_weight: f64,
    pub max_weight: f64,
    pub protected_min_weight: f64,
    pub max_weight_delta: f64,
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub max_threshold_delta: f64,
    pub min_rate: f64,
    pub max_rate: f64,
    pub max_rate_delta: f64,
    pub min_cooldown: i64,
    pub max_cooldown: i64,
    pub min_turns_per_hour: i64,
    pub max_turns_per_hour: i64,
    pub max_drive_count: usize,
    pub max_mutations_per_hour: u32,
}

impl Default for GuardrailLimits {
    fn default() -> Self {
        Self {
            protected_drives: ["curiosity", "emotions"].into_iter().map(String::from).collect(),
            min_weight: 0.3,
            max_weight: 3.0,
            protected_min_weight: 0.5,
            max_weight_delta: 0.5,
            min_threshold: 0.1,
            max_threshold: 2.0,
            max_threshold_delta: 0.2,
            min_rate: 0.001,
            max_rate: 1.0,
            max_rate_delta: 0.05,
            min_cooldown: 0,
            max_cooldown: 3600,
            min_turns_per_hour: 1,
            max_turns_per_hour: 100,
            max_drive_count: 20,
            max_mutations_per_hour: 20,
        }
    }
}

/// A clamped value plus whether clamping actually changed the proposal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped<T> {
    pub value: T,
    pub clamped: bool,
}

/// Bound-checks every mutation before the Mutator writes it to live state.
pub struct Guardrails<C: Clock> {
    limits: GuardrailLimits,
    clock: C,
    mutation_timestamps: VecDeque<u64>,
}

impl<C: Clock> Guardrails<C> {
    pub fn new(limits: GuardrailLimits, clock: C) -> Self {
        Self { limits, clock, mutation_timestamps: VecDeque::new() }
    }

    pub fn limits(&self) -> &GuardrailLimits {
        &self.limits
    }

    pub fn is_protected(&self, drive: &str) -> bool {
        self.limits.protected_drives.contains(drive)
    }

    /// Rolling per-hour mutation budget. Records this attempt's timestamp
    /// regardless of outcome — a rejected mutation still counts against the
    /// budget, matching `original_source`'s call-before-dispatch ordering.
    pub fn check_mutation_rate(&mut self) -> Result<(), GuardrailError> {
        let now = self.clock.epoch_secs();
        while let Some(&oldest) = self.mutation_timestamps.front() {
            if now.saturating_sub(oldest) > 3600 {
                self.mutation_timestamps.pop_front();
            } else {
                break;
            }
        }
        self.mutation_timestamps.push_back(now);
        if self.mutation_timestamps.len() as u32 > self.limits.max_mutations_per_hour {
            return Err(GuardrailError::RateExceeded(self.limits.max_mutations_per_hour));
        }
        Ok(())
    }

    pub fn validate_weight_change(&self, drive: &str, current: f64, proposed: f64) -> Clamped<f64> {
        let delta = (proposed - current).clamp(-self.limits.max_weight_delta, self.limits.max_weight_delta);
        let floor = if self.is_protected(drive) { self.limits.protected_min_weight } else { self.limits.min_weight };
        let value = (current + delta).clamp(floor, self.limits.max_weight);
        Clamped { value, clamped: (value - proposed).abs() > f64::EPSILON }
    }

    pub fn validate_threshold_change(&self, current: f64, proposed: f64) -> Clamped<f64> {
        let delta = (proposed - current).clamp(-self.limits.max_threshold_delta, self.limits.max_threshold_delta);
        let value = (current + delta).clamp(self.limits.min_threshold, self.limits.max_threshold);
        Clamped { value, clamped: (value - proposed).abs() > f64::EPSILON }
    }

    pub fn validate_rate_change(&self, current: f64, proposed: f64) -> Clamped<f64> {
        let delta = (proposed - current).clamp(-self.limits.max_rate_delta, self.limits.max_rate_delta);
        let value = (current + delta).clamp(self.limits.min_rate, self.limits.max_rate);
        Clamped { value, clamped: (value - proposed).abs() > f64::EPSILON }
    }

    pub fn validate_cooldown(&self, proposed: i64) -> Clamped<i64> {
        let value = proposed.clamp(self.limits.min_cooldown, self.limits.max_cooldown);
        Clamped { value, clamped: value != proposed }
    }

    pub fn validate_turns_per_hour(&self, proposed: i64) -> Clamped<i64> {
        let value = proposed.clamp(self.limits.min_turns_per_hour, self.limits.max_turns_per_hour);
        Clamped { value, clamped: value != proposed }
    }

    pub fn validate_drive_count(&self, current_count: usize) -> Result<(), GuardrailError> {
        if current_count >= self.limits.max_drive_count {
            return Err(GuardrailError::DriveCountExceeded(self.limits.max_drive_count));
        }
        Ok(())
    }

    pub fn validate_drive_removal(&self, drive: &str) -> Result<(), GuardrailError> {
        if self.is_protected(drive) {
            return Err(GuardrailError::ProtectedDrive(drive.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "guardrails_tests.rs"]
mod tests;
