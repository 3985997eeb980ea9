// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feedback Intake: applies a [`FeedbackMessage`] to live drives, whichever
//! channel it arrived on — a dropped `turn_result.json` file or a
//! `POST /feedback` body both funnel through [`apply_feedback`]. Grounded
//! on `original_source`'s `_process_feedback_file`: an explicit
//! `decay_overrides` entry is an absolute decay amount applied straight to
//! `Drive::decay`, otherwise the drive decays by the outcome's default
//! fraction of its current pressure, and `last_addressed` updates
//! unconditionally — even a `blocked` outcome means the drive was attended
//! to.

use std::collections::HashMap;
use std::path::Path;

use pulse_core::{Clock, DriveDecayResult, FeedbackMessage};
use pulse_engine::DriveEngine;

const FEEDBACK_FILE_NAME: &str = "turn_result.json";

/// Per-drive decay results keyed by drive name, echoed back verbatim as the
/// `drives_updated` field of the `/feedback` HTTP response.
pub type DrivesUpdated = HashMap<String, DriveDecayResult>;

/// Apply one feedback report to the named drives, returning a per-drive
/// decay result for callers that echo it back (the `/feedback` response).
pub fn apply_feedback<C: Clock>(
    drive_engine: &mut DriveEngine<C>,
    message: &FeedbackMessage,
    now: u64,
) -> DrivesUpdated {
    let mut results = HashMap::new();
    for name in &message.drives_addressed {
        let Some(drive) = drive_engine.drive_mut(name) else { continue };
        let before = drive.pressure;
        let decay_amount = match message.decay_overrides.get(name) {
            Some(&amount) => amount,
            None => before * message.outcome.default_decay_fraction(),
        };
        drive.decay(decay_amount);
        drive.last_addressed = now;
        results.insert(name.clone(), DriveDecayResult { before, after: drive.pressure, decayed: before - drive.pressure });
    }
    results
}

/// Read and delete a dropped `turn_result.json`, if present, returning the
/// parsed message. A malformed file is logged and removed rather than
/// retried forever.
pub fn take_dropped_feedback(state_dir: &Path) -> Option<FeedbackMessage> {
    let path = state_dir.join(FEEDBACK_FILE_NAME);
    let contents = std::fs::read_to_string(&path).ok()?;
    let _ = std::fs::remove_file(&path);
    match serde_json::from_str(&contents) {
        Ok(message) => Some(message),
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "malformed turn_result.json, discarding");
            None
        }
    }
}

#[cfg(test)]
#[path = "feedback_tests.rs"]
mod tests;
