// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pulse_core::SystemReading;

#[tokio::test]
async fn no_alerts_with_a_permissive_threshold_and_no_watched_processes() {
    let mut sensor = SystemSensor::new(100, Vec::new());
    let value = sensor.read().await.unwrap();
    let reading: SystemReading = serde_json::from_value(value).unwrap();
    assert!(reading.alerts.is_empty());
}

#[tokio::test]
async fn unrealistic_memory_threshold_always_alerts() {
    let mut sensor = SystemSensor::new(0, Vec::new());
    let value = sensor.read().await.unwrap();
    let reading: SystemReading = serde_json::from_value(value).unwrap();
    assert!(reading.alerts.iter().any(|a| a.kind == "memory_pressure"));
}

#[tokio::test]
async fn watching_a_nonexistent_process_reports_process_down() {
    let mut sensor = SystemSensor::new(100, vec!["definitely-not-a-real-process-xyz".to_string()]);
    let value = sensor.read().await.unwrap();
    let reading: SystemReading = serde_json::from_value(value).unwrap();
    assert!(reading.alerts.iter().any(|a| a.kind == "process_down"));
}

#[tokio::test]
async fn watching_the_current_process_finds_it_running() {
    // The test binary itself is always running, so matching on a fragment
    // of its own argv (its executable path) must never raise process_down.
    let exe = std::env::current_exe().unwrap();
    let marker = exe.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();
    let mut sensor = SystemSensor::new(100, vec![marker]);
    let value = sensor.read().await.unwrap();
    let reading: SystemReading = serde_json::from_value(value).unwrap();
    assert!(!reading.alerts.iter().any(|a| a.kind == "process_down"));
}
