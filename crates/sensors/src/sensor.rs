// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Sensor` trait every environmental observer implements.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SensorError;

/// A passive environmental observer the Sensor Manager supervises.
///
/// Sensors never make model calls; they watch the world and feed raw
/// signals to the Drive Engine. `initialize`/`stop` set up and tear down
/// watchers, queues, or connections; `read` returns the current reading and
/// may block briefly.
#[async_trait]
pub trait Sensor: Send + 'static {
    fn name(&self) -> &str;

    async fn initialize(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    async fn read(&mut self) -> Result<Value, SensorError>;

    async fn stop(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
}
