// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use serde_json::json;

struct OkSensor {
    name: &'static str,
    value: serde_json::Value,
}

#[async_trait]
impl Sensor for OkSensor {
    fn name(&self) -> &str {
        self.name
    }

    async fn read(&mut self) -> Result<serde_json::Value, SensorError> {
        Ok(self.value.clone())
    }
}

struct FailingSensor;

#[async_trait]
impl Sensor for FailingSensor {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn read(&mut self) -> Result<serde_json::Value, SensorError> {
        Err(SensorError::Read("boom".to_string()))
    }
}

use crate::error::SensorError;

#[tokio::test]
async fn read_combines_all_sensor_readings() {
    let manager = SensorManager::new();
    manager.add_sensor(Box::new(OkSensor { name: "a", value: json!({"ok": true}) }));
    manager.add_sensor(Box::new(OkSensor { name: "b", value: json!({"ok": false}) }));

    let readings = manager.read().await;
    assert_eq!(readings.len(), 2);
    assert_eq!(readings["a"], json!({"ok": true}));
    assert_eq!(readings["b"], json!({"ok": false}));
}

#[tokio::test]
async fn failing_sensor_reports_error_payload_without_wedging_others() {
    let manager = SensorManager::new();
    manager.add_sensor(Box::new(OkSensor { name: "healthy", value: json!({"fine": true}) }));
    manager.add_sensor(Box::new(FailingSensor));

    let readings = manager.read().await;
    assert_eq!(readings.len(), 2);
    assert_eq!(readings["healthy"], json!({"fine": true}));
    assert!(readings["flaky"].get("error").is_some());
}

#[tokio::test]
async fn add_sensor_is_visible_to_next_read() {
    let manager = SensorManager::new();
    assert!(manager.read().await.is_empty());

    manager.add_sensor(Box::new(OkSensor { name: "late", value: json!({"added": "runtime"}) }));
    let readings = manager.read().await;
    assert_eq!(readings.len(), 1);
    assert_eq!(readings["late"], json!({"added": "runtime"}));
}
