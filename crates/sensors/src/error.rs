// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor initialization failed: {0}")]
    Init(String),
    #[error("sensor read failed: {0}")]
    Read(String),
}
