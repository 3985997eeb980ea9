// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the cognitive control loop's stateful components.
///
/// Most failures in this crate are local by design (sensor/evaluator/mutation
/// errors recover without propagating) — this enum exists for the few paths
/// that must surface: storage failures underneath the Drive Engine/Mutator,
/// and the Trigger Dispatcher's webhook call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] pulse_storage::StorageError),
    #[error("webhook request failed: {0}")]
    Webhook(#[from] reqwest::Error),
    #[error("unknown drive: {0}")]
    UnknownDrive(String),
}
