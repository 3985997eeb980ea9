// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Drive Engine: time-based pressure accumulation, sensor-driven spikes,
//! and proportional decay on trigger outcomes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use pulse_config::{DrivesConfig, WorkspaceConfig};
use pulse_core::{Clock, Drive, DriveState, FilesystemReading, SensorData, SystemReading, TriggerDecision};
use serde_json::Value;

/// Default weight given to the `system` drive the first time a system alert
/// spikes it, matching `original_source`'s `Drive(name="system", ...,
/// weight=1.5)` construction-on-demand.
const SYSTEM_DRIVE_DEFAULT_WEIGHT: f64 = 1.5;
const FILESYSTEM_SPIKE: f64 = 0.1;
const SYSTEM_ALERT_SPIKE: f64 = 0.5;
const SYSTEM_ALERT_PRESSURE_CEILING: f64 = 1.0;
const HYPOTHESES_SPIKE_PER_ITEM: f64 = 0.02;
const HYPOTHESES_SPIKE_CAP: f64 = 0.1;
const EMOTION_INTENSITY_THRESHOLD: f64 = 0.7;
const EMOTION_SPIKE: f64 = 0.15;

/// Manages all drives and their pressure accumulation.
///
/// Generic over [`Clock`] so tests can advance time deterministically
/// instead of sleeping — the same convention as
/// `pulse_storage::StateStore<C: Clock>`.
pub struct DriveEngine<C: Clock> {
    drives: HashMap<String, Drive>,
    clock: C,
    last_tick: u64,
    source_cache: HashMap<PathBuf, (SystemTime, Value)>,
    min_trigger_interval: u64,
}

impl<C: Clock> DriveEngine<C> {
    pub fn new(config: &DrivesConfig, min_trigger_interval: u64, clock: C) -> Self {
        let drives = config
            .categories
            .iter()
            .map(|(name, cat)| (name.clone(), Drive::new(name.clone(), name.clone(), cat.weight)))
            .collect();
        let last_tick = clock.epoch_secs();
        Self { drives, clock, last_tick, source_cache: HashMap::new(), min_trigger_interval }
    }

    pub fn drives(&self) -> impl Iterator<Item = &Drive> {
        self.drives.values()
    }

    pub fn drive(&self, name: &str) -> Option<&Drive> {
        self.drives.get(name)
    }

    /// Update all drives. Called every loop iteration: pure state
    /// transitions plus sensor spikes. File I/O lives in
    /// [`DriveEngine::refresh_sources`], kept separate per spec.
    pub fn tick(&mut self, config: &DrivesConfig, sensor_data: &SensorData) -> DriveState {
        let now = self.clock.epoch_secs();
        let dt = now.saturating_sub(self.last_tick) as f64;
        self.last_tick = now;

        for drive in self.drives.values_mut() {
            drive.tick(dt, config.pressure_rate, config.max_pressure);
        }

        self.apply_sensor_spikes(config, sensor_data);

        DriveState::new(self.drives.values().cloned().collect(), now)
    }

    /// Read workspace source files and apply one-time spikes on detected
    /// change. Separated from `tick` to isolate I/O from pure state
    /// transitions.
    pub fn refresh_sources(&mut self, config: &DrivesConfig, workspace: &WorkspaceConfig) {
        if let (Some(data), true) = self.read_cached_json(&workspace.resolve_path(&workspace.hypotheses)) {
            let items: Vec<&Value> = match &data {
                Value::Array(items) => items.iter().collect(),
                Value::Object(map) => map.get("hypotheses").and_then(|v| v.as_array()).map(|a| a.iter().collect()).unwrap_or_default(),
                _ => Vec::new(),
            };
            let untested = items.iter().filter(|h| h.is_object() && h.get("outcome").is_none()).count();
            if untested > 0 {
                if let Some(drive) = self.drives.get_mut("unfinished") {
                    let boost = (untested as f64 * HYPOTHESES_SPIKE_PER_ITEM).min(HYPOTHESES_SPIKE_CAP);
                    drive.spike(boost, config.max_pressure);
                    tracing::debug!(untested, boost, "hypotheses changed, spiked unfinished");
                }
            }
        }

        if let (Some(data), true) = self.read_cached_json(&workspace.resolve_path(&workspace.emotions)) {
            let intensity = data.get("intensity").and_then(Value::as_f64).unwrap_or(0.0);
            if intensity > EMOTION_INTENSITY_THRESHOLD {
                if let Some(drive) = self.drives.get_mut("emotions") {
                    drive.spike(EMOTION_SPIKE, config.max_pressure);
                    tracing::debug!(intensity, "emotional state changed, spiked emotions");
                }
            }
        }
    }

    /// Read a JSON file with mtime caching. Returns `(data, changed)` —
    /// `changed` is true only on first read or when mtime differs from the
    /// cached value; a read error or missing file yields `(None, false)`.
    fn read_cached_json(&mut self, path: &std::path::Path) -> (Option<Value>, bool) {
        let Ok(metadata) = std::fs::metadata(path) else { return (None, false) };
        let Ok(mtime) = metadata.modified() else { return (None, false) };
        if let Some((cached_mtime, cached_data)) = self.source_cache.get(path) {
            if *cached_mtime == mtime {
                return (Some(cached_data.clone()), false);
            }
        }
        let Ok(raw) = std::fs::read_to_string(path) else { return (None, false) };
        let Ok(data) = serde_json::from_str::<Value>(&raw) else { return (None, false) };
        self.source_cache.insert(path.to_path_buf(), (mtime, data.clone()));
        (Some(data), true)
    }

    fn apply_sensor_spikes(&mut self, config: &DrivesConfig, sensor_data: &SensorData) {
        if let Some(value) = sensor_data.get("filesystem") {
            if let Ok(reading) = serde_json::from_value::<FilesystemReading>(value.clone()) {
                if !reading.changes.is_empty() {
                    if let Some(drive) = self.drives.get_mut("goals") {
                        drive.spike(FILESYSTEM_SPIKE, config.max_pressure);
                    }
                }
            }
        }

        let alerts = sensor_data
            .get("system")
            .and_then(|v| serde_json::from_value::<SystemReading>(v.clone()).ok())
            .map(|r| r.alerts)
            .unwrap_or_default();
        if !alerts.is_empty() {
            self.drives.entry("system".to_string()).or_insert_with(|| {
                Drive::new("system", "system", SYSTEM_DRIVE_DEFAULT_WEIGHT)
            });
            let now = self.clock.epoch_secs();
            let drive = self.drives.get_mut("system").expect("just inserted");
            let since_addressed = now.saturating_sub(drive.last_addressed);
            if since_addressed > self.min_trigger_interval && drive.pressure < SYSTEM_ALERT_PRESSURE_CEILING {
                drive.spike(SYSTEM_ALERT_SPIKE, config.max_pressure);
                tracing::debug!(count = alerts.len(), "system alert spike");
            } else {
                tracing::debug!(since_addressed, pressure = drive.pressure, "system alert suppressed");
            }
        }
    }

    /// Proportional decay across all positive-pressure drives after a
    /// successful trigger, with an adaptive multiplier when total pressure
    /// is large. Marks the top drive as addressed.
    pub fn on_trigger_success(&mut self, config: &DrivesConfig, decision: &TriggerDecision) {
        let mut decay_total = config.success_decay;
        if config.adaptive_decay && decision.total_pressure > 5.0 {
            decay_total *= (decision.total_pressure / 5.0).min(3.0);
        }

        if decision.total_pressure > 0.0 {
            for drive in self.drives.values_mut() {
                if drive.pressure > 0.0 {
                    let proportion = drive.weighted_pressure() / decision.total_pressure;
                    drive.decay(decay_total * proportion * 2.0);
                }
            }
        }

        if let Some(top_drive) = decision.top_drive.as_ref() {
            if let Some(drive) = self.drives.get_mut(top_drive) {
                drive.last_addressed = self.clock.epoch_secs();
                tracing::info!(drive = %top_drive, "drives decayed after successful turn");
            }
        }
    }

    /// Spike the top drive after a failed trigger (frustration increases
    /// pressure).
    pub fn on_trigger_failure(&mut self, config: &DrivesConfig, decision: &TriggerDecision) {
        if let Some(top_drive) = decision.top_drive.as_ref() {
            if let Some(drive) = self.drives.get_mut(top_drive) {
                drive.spike(config.failure_boost, config.max_pressure);
                tracing::warn!(drive = %top_drive, pressure = drive.pressure, "drive boosted after failed trigger");
            }
        }
    }

    /// Restore drive pressures and runtime-added drives from persisted
    /// state. Drives present in config keep their configured weight unless
    /// the snapshot overrides it; drives absent from config (created at
    /// runtime via `add_drive`) are recreated wholesale.
    pub fn restore_state(&mut self, saved: &HashMap<String, Drive>) {
        for (name, data) in saved {
            match self.drives.get_mut(name) {
                Some(drive) => {
                    drive.pressure = data.pressure;
                    drive.weight = data.weight;
                    drive.last_addressed = data.last_addressed;
                }
                None => {
                    tracing::info!(drive = %name, weight = data.weight, "restored runtime drive");
                    self.drives.insert(name.clone(), data.clone());
                }
            }
        }
        tracing::info!(count = saved.len(), "restored drive states");
    }

    /// Serialize drive state for persistence.
    pub fn save_state(&self) -> HashMap<String, Drive> {
        self.drives.clone()
    }

    /// Insert or overwrite a drive directly — used by the Mutator for
    /// `add_drive`/`remove_drive`/`adjust_weight`/`spike_drive`/`decay_drive`.
    pub fn set_drive(&mut self, drive: Drive) {
        self.drives.insert(drive.name.clone(), drive);
    }

    pub fn remove_drive(&mut self, name: &str) -> Option<Drive> {
        self.drives.remove(name)
    }

    pub fn drive_mut(&mut self, name: &str) -> Option<&mut Drive> {
        self.drives.get_mut(name)
    }
}

#[cfg(test)]
#[path = "drive_engine_tests.rs"]
mod tests;
