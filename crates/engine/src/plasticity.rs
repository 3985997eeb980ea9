// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plasticity (drive evolution): adjusts drive weights from a rolling window
//! of evaluation outcomes. `original_source/src/evolution/plasticity.py` uses
//! a piecewise formula; this implementation follows spec.md §4.8's unified
//! composite-score formula instead (a deliberate divergence, recorded in
//! `DESIGN.md`).

use std::collections::{HashMap, HashSet, VecDeque};

use pulse_core::{Clock, MutationRecord};
use pulse_storage::MutationLog;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::EngineError;

const HISTORY_WINDOW: usize = 20;
const EVOLUTION_INTERVAL: usize = 10;
const MIN_RECORDS: usize = 3;
const MAX_DELTA_PER_CYCLE: f64 = 0.1;
const DEAD_ZONE_LOW: f64 = 0.4;
const DEAD_ZONE_HIGH: f64 = 0.6;

/// One recorded evaluation outcome for a single drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub success: bool,
    /// Clamped to `[0,1]`.
    pub quality_score: f64,
    /// Given on a 0-10 scale by callers; normalized to `[0,1]` on insert.
    pub loop_average: f64,
    pub context: String,
}

/// Bounds plasticity shares with [`crate::guardrails::Guardrails`] — both
/// modules clamp the same weight domain, so protected drives get the same
/// floor in each.
#[derive(Debug, Clone)]
pub struct PlasticityLimits {
    pub protected_drives: HashSet<String>,
    pub min_weight: f64,
    pub max_weight: f64,
    pub protected_min_weight: f64,
}

impl Default for PlasticityLimits {
    fn default() -> Self {
        Self {
            protected_drives: ["curiosity", "emotions"].into_iter().map(String::from).collect(),
            min_weight: 0.3,
            max_weight: 3.0,
            protected_min_weight: 0.5,
        }
    }
}

/// Result of evolving one drive's weight.
#[derive(Debug, Clone, PartialEq)]
pub struct PlasticityChange {
    pub drive: String,
    pub before: f64,
    pub after: f64,
    pub composite: f64,
}

pub struct Plasticity<C: Clock> {
    limits: PlasticityLimits,
    log: MutationLog,
    clock: C,
    history: HashMap<String, VecDeque<OutcomeRecord>>,
    recordings_since_evolution: usize,
}

impl<C: Clock> Plasticity<C> {
    pub fn new(limits: PlasticityLimits, log: MutationLog, clock: C) -> Self {
        Self { limits, log, clock, history: HashMap::new(), recordings_since_evolution: 0 }
    }

    /// Snapshot the rolling per-drive outcome windows for persistence to
    /// `drive-performance.json`.
    pub fn save_history(&self) -> HashMap<String, VecDeque<OutcomeRecord>> {
        self.history.clone()
    }

    /// Restore rolling per-drive outcome windows from a prior snapshot.
    pub fn restore_history(&mut self, history: HashMap<String, VecDeque<OutcomeRecord>>) {
        self.history = history;
    }

    /// Record one evaluation outcome for a drive. Returns `true` once
    /// `evolution_interval` recordings have accumulated and [`Plasticity::evolve`]
    /// should be called this tick.
    pub fn record(&mut self, drive: &str, outcome: OutcomeRecord) -> bool {
        let normalized = OutcomeRecord {
            success: outcome.success,
            quality_score: outcome.quality_score.clamp(0.0, 1.0),
            loop_average: (outcome.loop_average / 10.0).clamp(0.0, 1.0),
            context: outcome.context,
        };
        let window = self.history.entry(drive.to_string()).or_default();
        window.push_back(normalized);
        while window.len() > HISTORY_WINDOW {
            window.pop_front();
        }
        self.recordings_since_evolution += 1;
        if self.recordings_since_evolution >= EVOLUTION_INTERVAL {
            self.recordings_since_evolution = 0;
            true
        } else {
            false
        }
    }

    /// Evolve every drive with at least `MIN_RECORDS` recordings, writing an
    /// audit entry of type `drive_evolution` for each change. Drives inside
    /// the dead zone (`0.4 <= composite <= 0.6`) are left untouched.
    pub fn evolve(
        &self,
        current_weights: &HashMap<String, f64>,
    ) -> Result<Vec<PlasticityChange>, EngineError> {
        let mut changes = Vec::new();
        for (drive, window) in &self.history {
            if window.len() < MIN_RECORDS {
                continue;
            }
            let Some(&current) = current_weights.get(drive) else { continue };

            let n = window.len() as f64;
            let true_positive_rate = window.iter().filter(|r| r.success).count() as f64 / n;
            let avg_quality = window.iter().map(|r| r.quality_score).sum::<f64>() / n;
            let false_positive_rate = window.iter().filter(|r| !r.success).count() as f64 / n;
            let composite = 0.4 * true_positive_rate + 0.3 * avg_quality + 0.3 * (1.0 - false_positive_rate);

            if (DEAD_ZONE_LOW..=DEAD_ZONE_HIGH).contains(&composite) {
                continue;
            }

            let raw_delta = (composite - 0.5) * 0.5;
            let delta = raw_delta.clamp(-MAX_DELTA_PER_CYCLE, MAX_DELTA_PER_CYCLE);
            let floor = if self.limits.protected_drives.contains(drive) {
                self.limits.protected_min_weight
            } else {
                self.limits.min_weight
            };
            let after = (current + delta).clamp(floor, self.limits.max_weight);
            if (after - current).abs() < f64::EPSILON {
                continue;
            }

            self.record_audit(drive, current, after, composite)?;
            changes.push(PlasticityChange { drive: drive.clone(), before: current, after, composite });
        }
        Ok(changes)
    }

    fn record_audit(&self, drive: &str, before: f64, after: f64, composite: f64) -> Result<(), EngineError> {
        let record = MutationRecord::new(
            self.clock.epoch_secs(),
            "drive_evolution",
            format!("drives.{drive}.weight"),
            json!(before),
            json!(after),
            format!("composite={composite:.3}"),
        );
        self.log.append(&record)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "plasticity_tests.rs"]
mod tests;
