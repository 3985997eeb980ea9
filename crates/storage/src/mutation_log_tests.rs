// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn record(ts: u64, target: &str) -> MutationRecord {
    MutationRecord::new(ts, "spike_drive", target, json!(1.0), json!(1.3), "test")
}

#[test]
fn append_and_recent_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let log = MutationLog::new(dir.path().join("mutations.jsonl"));
    log.append(&record(1, "curiosity")).unwrap();
    log.append(&record(2, "maintenance")).unwrap();

    let recent = log.recent(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].target, "curiosity");
    assert_eq!(recent[1].target, "maintenance");
}

#[test]
fn recent_caps_at_n() {
    let dir = tempfile::tempdir().unwrap();
    let log = MutationLog::new(dir.path().join("mutations.jsonl"));
    for i in 0..5 {
        log.append(&record(i, "curiosity")).unwrap();
    }
    assert_eq!(log.recent(2).unwrap().iter().map(|r| r.ts).collect::<Vec<_>>(), vec![3, 4]);
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let log = MutationLog::new(dir.path().join("nope.jsonl"));
    assert!(log.recent(10).unwrap().is_empty());
}
