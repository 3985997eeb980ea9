// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pulse_core::FakeClock;
use serde::Deserialize;

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Dummy {
    counter: u64,
}

#[test]
fn missing_file_loads_as_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"), 60, FakeClock::new());
    let loaded: Dummy = store.load();
    assert_eq!(loaded, Dummy::default());
}

#[test]
fn corrupt_file_loads_as_default_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "not json at all").unwrap();
    let store = StateStore::new(&path, 60, FakeClock::new());
    let loaded: Dummy = store.load();
    assert_eq!(loaded, Dummy::default());
}

#[test]
fn first_maybe_save_always_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let store = StateStore::new(&path, 60, FakeClock::new());
    let wrote = store.maybe_save(&Dummy { counter: 1 }).unwrap();
    assert!(wrote);
    let loaded: Dummy = store.load();
    assert_eq!(loaded, Dummy { counter: 1 });
}

#[test]
fn debounce_skips_write_before_interval_elapses() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let store = StateStore::new(dir.path().join("state.json"), 60, clock.clone());

    assert!(store.maybe_save(&Dummy { counter: 1 }).unwrap());
    clock.advance(std::time::Duration::from_secs(5));
    assert!(!store.maybe_save(&Dummy { counter: 2 }).unwrap());

    let loaded: Dummy = store.load();
    assert_eq!(loaded, Dummy { counter: 1 }, "second save should have been skipped by the debounce");
}

#[test]
fn debounce_writes_after_interval_elapses() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let store = StateStore::new(dir.path().join("state.json"), 60, clock.clone());

    assert!(store.maybe_save(&Dummy { counter: 1 }).unwrap());
    clock.advance(std::time::Duration::from_secs(61));
    assert!(store.maybe_save(&Dummy { counter: 2 }).unwrap());

    let loaded: Dummy = store.load();
    assert_eq!(loaded, Dummy { counter: 2 });
}

#[test]
fn request_save_forces_a_write_inside_the_interval() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let store = StateStore::new(dir.path().join("state.json"), 60, clock.clone());

    assert!(store.maybe_save(&Dummy { counter: 1 }).unwrap());
    clock.advance(std::time::Duration::from_secs(1));
    store.request_save();
    assert!(store.maybe_save(&Dummy { counter: 2 }).unwrap());

    let loaded: Dummy = store.load();
    assert_eq!(loaded, Dummy { counter: 2 });
}
