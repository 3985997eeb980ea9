// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host health monitor: memory pressure and watched-process liveness.
//! Grounded on `original_source`'s `SystemSensor`, which shells out to
//! `vm_stat`/`pgrep` under a 5s timeout; this port uses `sysinfo` for a
//! portable, non-macOS-only equivalent of the same two checks, still bounded
//! by the same timeout since a stalled sysinfo refresh must never stall a
//! tick.

use std::time::Duration;

use async_trait::async_trait;
use pulse_core::SystemAlert;
use serde_json::Value;
use sysinfo::System;

use crate::error::SensorError;
use crate::sensor::Sensor;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SystemSensor {
    memory_threshold_percent: u8,
    watch_processes: Vec<String>,
}

impl SystemSensor {
    pub fn new(memory_threshold_percent: u8, watch_processes: Vec<String>) -> Self {
        Self { memory_threshold_percent, watch_processes }
    }

    fn check(memory_threshold_percent: u8, watch_processes: &[String]) -> Vec<SystemAlert> {
        let mut alerts = Vec::new();
        let mut system = System::new_all();
        system.refresh_all();

        let total = system.total_memory();
        if total > 0 {
            let used_percent = (system.used_memory() as f64 / total as f64) * 100.0;
            if used_percent > memory_threshold_percent as f64 {
                alerts.push(SystemAlert {
                    kind: "memory_pressure".to_string(),
                    message: format!(
                        "memory usage at {used_percent:.1}% exceeds threshold of {memory_threshold_percent}%"
                    ),
                });
            }
        }

        for proc_name in watch_processes {
            let running = system.processes().values().any(|proc| {
                proc.name().to_string_lossy().contains(proc_name.as_str())
                    || proc.cmd().iter().any(|arg| arg.to_string_lossy().contains(proc_name.as_str()))
            });
            if !running {
                alerts.push(SystemAlert {
                    kind: "process_down".to_string(),
                    message: format!("watched process '{proc_name}' is not running"),
                });
            }
        }

        alerts
    }
}

#[async_trait]
impl Sensor for SystemSensor {
    fn name(&self) -> &str {
        "system"
    }

    async fn read(&mut self) -> Result<Value, SensorError> {
        let threshold = self.memory_threshold_percent;
        let watch_processes = self.watch_processes.clone();

        let alerts = tokio::time::timeout(
            CHECK_TIMEOUT,
            tokio::task::spawn_blocking(move || Self::check(threshold, &watch_processes)),
        )
        .await
        .map_err(|_| SensorError::Read("system check timed out after 5s".to_string()))?
        .map_err(|err| SensorError::Read(format!("system check task panicked: {err}")))?;

        if !alerts.is_empty() {
            tracing::debug!(count = alerts.len(), "system sensor raised alerts");
        }
        serde_json::to_value(pulse_core::SystemReading { alerts }).map_err(|err| SensorError::Read(err.to_string()))
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
