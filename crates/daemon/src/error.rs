// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-level error type. The CLI binary and `pulse_daemon::run` entry
//! point surface these wrapped in `anyhow::Result`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("another pulse daemon is already running (lock held at {0})")]
    AlreadyRunning(PathBuf),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] pulse_config::ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] pulse_storage::StorageError),

    #[error("sensor error: {0}")]
    Sensor(#[from] pulse_sensors::SensorError),

    #[error("engine error: {0}")]
    Engine(#[from] pulse_engine::EngineError),

    #[error("health surface error: {0}")]
    Health(std::io::Error),
}
