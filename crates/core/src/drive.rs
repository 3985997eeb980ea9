// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives: accumulating internal motivations that compose into pressure.

use serde::{Deserialize, Serialize};

/// A single drive — an internal motivation with accumulating pressure.
///
/// `pressure` only ever moves through [`Drive::tick`], [`Drive::spike`], and
/// [`Drive::decay`]; nothing else is allowed to write it directly so the
/// `0 <= pressure <= max_pressure` invariant holds everywhere but during a
/// tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drive {
    pub name: String,
    pub category: String,
    #[serde(serialize_with = "round4")]
    pub pressure: f64,
    pub weight: f64,
    /// Unix epoch seconds, or 0 if never addressed.
    pub last_addressed: u64,
}

impl Drive {
    pub fn new(name: impl Into<String>, category: impl Into<String>, weight: f64) -> Self {
        Self { name: name.into(), category: category.into(), pressure: 0.0, weight, last_addressed: 0 }
    }

    pub fn weighted_pressure(&self) -> f64 {
        self.pressure * self.weight
    }

    /// Accumulate pressure linearly with elapsed wall-clock time. `rate` is per-minute.
    pub fn tick(&mut self, dt_secs: f64, rate: f64, max_pressure: f64) {
        self.pressure = (self.pressure + rate * (dt_secs / 60.0) * self.weight).min(max_pressure);
    }

    /// Reduce pressure after being addressed.
    pub fn decay(&mut self, amount: f64) {
        self.pressure = (self.pressure - amount).max(0.0);
    }

    /// Immediate pressure increase from an external event.
    pub fn spike(&mut self, amount: f64, max_pressure: f64) {
        self.pressure = (self.pressure + amount).min(max_pressure);
    }
}

fn round4<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 10_000.0).round() / 10_000.0)
}

/// A snapshot of all drives at a point in time. Produced once per tick and
/// never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveState {
    pub drives: Vec<Drive>,
    pub ts: u64,
    pub total_pressure: f64,
    pub top_drive: Option<String>,
}

impl DriveState {
    pub fn new(drives: Vec<Drive>, ts: u64) -> Self {
        let total_pressure = drives.iter().map(Drive::weighted_pressure).sum();
        let top_drive = drives
            .iter()
            .max_by(|a, b| a.weighted_pressure().partial_cmp(&b.weighted_pressure()).unwrap_or(std::cmp::Ordering::Equal))
            .map(|d| d.name.clone());
        Self { drives, ts, total_pressure, top_drive }
    }

    pub fn top_drive(&self) -> Option<&Drive> {
        let name = self.top_drive.as_deref()?;
        self.drives.iter().find(|d| d.name == name)
    }

    pub fn top_weighted_pressure(&self) -> f64 {
        self.top_drive().map(Drive::weighted_pressure).unwrap_or(0.0)
    }
}

#[cfg(test)]
#[path = "drive_tests.rs"]
mod tests;
