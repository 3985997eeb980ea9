// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What the State Store persists to `pulse-state.json`. Mirrors
//! `original_source`'s snapshot shape — drives, `config_overrides`, and a
//! `_saved_at` timestamp — per spec.md §6's persisted state layout.

use std::collections::HashMap;

use pulse_core::Drive;
use pulse_engine::ConfigOverrides;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseState {
    #[serde(default)]
    pub drives: HashMap<String, Drive>,
    #[serde(default)]
    pub config_overrides: ConfigOverrides,
    #[serde(default)]
    pub saved_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_hint: Option<GenerateHint>,
}

/// Written instead of an actual generation call when the loop's GENERATE
/// step fires (high pressure, idle window elapsed): a note for whatever
/// external process is watching for one, not an LLM invocation itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateHint {
    pub ts: u64,
    pub top_drive: Option<String>,
    pub total_pressure: f64,
}
