// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervises the registered sensors, fanning reads out concurrently and
//! catching per-sensor failures so one misbehaving sensor never wedges the
//! tick. Grounded on `original_source`'s `SensorManager.read` try/except
//! fan-in, reshaped into a `JoinSet` so sensors run concurrently instead of
//! sequentially (the teacher's `tokio` stack already favors a `JoinSet`/
//! `mpsc` style for fan-out work over the daemon loop).

use std::sync::Arc;

use parking_lot::Mutex as SyncMutex;
use pulse_core::{error_payload, SensorData};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinSet;

use crate::sensor::Sensor;

type SharedSensor = Arc<AsyncMutex<Box<dyn Sensor>>>;

/// Coordinates all sensor modules and fans `read()` out across them.
#[derive(Default)]
pub struct SensorManager {
    sensors: SyncMutex<Vec<(String, SharedSensor)>>,
}

impl SensorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sensor. Permitted at runtime, not just at startup, so
    /// other subsystems may introduce watchers after the daemon is up.
    pub fn add_sensor(&self, sensor: Box<dyn Sensor>) {
        let name = sensor.name().to_string();
        tracing::info!(sensor = %name, "registered sensor");
        self.sensors.lock().push((name, Arc::new(AsyncMutex::new(sensor))));
    }

    fn snapshot(&self) -> Vec<(String, SharedSensor)> {
        self.sensors.lock().clone()
    }

    /// Initialize every registered sensor.
    pub async fn start(&self) {
        for (name, sensor) in self.snapshot() {
            let mut guard = sensor.lock().await;
            if let Err(err) = guard.initialize().await {
                tracing::warn!(sensor = %name, error = %err, "sensor failed to initialize");
            }
        }
        tracing::info!(count = self.sensors.lock().len(), "sensors started");
    }

    /// Stop every registered sensor, releasing its resources.
    pub async fn stop(&self) {
        for (name, sensor) in self.snapshot() {
            let mut guard = sensor.lock().await;
            if let Err(err) = guard.stop().await {
                tracing::warn!(sensor = %name, error = %err, "error stopping sensor");
            }
        }
        tracing::info!("all sensors stopped");
    }

    /// Read all sensors concurrently, returning a combined reading keyed by
    /// sensor name. A sensor that errors reports `{"error": <msg>}` in its
    /// slot instead of failing the whole read.
    pub async fn read(&self) -> SensorData {
        let mut set = JoinSet::new();
        for (name, sensor) in self.snapshot() {
            set.spawn(async move {
                let mut guard = sensor.lock().await;
                let result = guard.read().await;
                (name, result)
            });
        }

        let mut readings = SensorData::new();
        while let Some(outcome) = set.join_next().await {
            match outcome {
                Ok((name, Ok(value))) => {
                    readings.insert(name, value);
                }
                Ok((name, Err(err))) => {
                    tracing::warn!(sensor = %name, error = %err, "sensor read failed");
                    readings.insert(name, error_payload(err));
                }
                Err(join_err) => {
                    tracing::warn!(error = %join_err, "sensor task panicked");
                }
            }
        }
        readings
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
