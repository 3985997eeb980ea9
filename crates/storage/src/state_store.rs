// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic, debounced persistence for the daemon's runtime state: temp-sibling
//! write followed by rename, the same crash-safe idiom the teacher's
//! snapshot/checkpoint layer uses for its own point-in-time state dumps.

use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use pulse_core::Clock;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;

/// Debounced atomic state persistence.
///
/// `maybe_save` is meant to be called once per daemon-loop tick; a real
/// write only happens once `save_interval_secs` has elapsed since the last
/// write, or [`StateStore::request_save`] was called to force one.
pub struct StateStore<C: Clock> {
    path: PathBuf,
    save_interval_secs: u64,
    clock: C,
    last_saved_at: Mutex<u64>,
    forced: Mutex<bool>,
}

impl<C: Clock> StateStore<C> {
    pub fn new(path: impl Into<PathBuf>, save_interval_secs: u64, clock: C) -> Self {
        Self { path: path.into(), save_interval_secs, clock, last_saved_at: Mutex::new(0), forced: Mutex::new(true) }
    }

    /// Load persisted state, or `T::default()` if the file is missing or
    /// corrupt. Corruption is logged, never propagated as an error — a
    /// fresh start is always preferable to refusing to boot.
    pub fn load<T: DeserializeOwned + Default>(&self) -> T {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return T::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(error = %err, path = %self.path.display(), "corrupt state file, starting fresh");
                T::default()
            }
        }
    }

    /// Mark the next `maybe_save` call as a forced write regardless of the
    /// debounce interval.
    pub fn request_save(&self) {
        *self.forced.lock() = true;
    }

    /// Write `state` if the debounce interval elapsed or a save was
    /// explicitly requested. Returns whether a write actually happened.
    pub fn maybe_save<T: Serialize>(&self, state: &T) -> Result<bool, StorageError> {
        let now = self.clock.epoch_secs();
        let mut forced = self.forced.lock();
        let mut last_saved_at = self.last_saved_at.lock();
        let elapsed = now.saturating_sub(*last_saved_at);
        if !*forced && elapsed < self.save_interval_secs {
            return Ok(false);
        }
        self.write_atomic(state)?;
        *last_saved_at = now;
        *forced = false;
        Ok(true)
    }

    fn write_atomic<T: Serialize>(&self, state: &T) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_store_tests.rs"]
mod tests;
