// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn spike(drive: &str) -> MutationCommand {
    MutationCommand::SpikeDrive { drive: drive.to_string(), amount: 0.3, reason: "test".to_string() }
}

#[test]
fn drain_on_missing_file_returns_empty() {
    let dir = tempfile::tempdir().unwrap();
    let queue = MutationQueue::new(dir.path().join("mutations.json"));
    assert_eq!(queue.drain().unwrap(), Some(Vec::new()));
}

#[test]
fn enqueue_then_drain_round_trips_and_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mutations.json");
    let queue = MutationQueue::new(&path);

    queue.enqueue(spike("curiosity")).unwrap();
    queue.enqueue(spike("maintenance")).unwrap();

    let drained = queue.drain().unwrap().unwrap();
    assert_eq!(drained.len(), 2);

    let second_drain = queue.drain().unwrap().unwrap();
    assert!(second_drain.is_empty(), "queue should be truncated to [] after a drain");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn drain_skips_when_already_locked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mutations.json");
    let queue = MutationQueue::new(&path);
    queue.enqueue(spike("curiosity")).unwrap();

    let held = std::fs::OpenOptions::new().read(true).write(true).open(&path).unwrap();
    fs2::FileExt::lock_exclusive(&held).unwrap();

    assert_eq!(queue.drain().unwrap(), None);

    fs2::FileExt::unlock(&held).unwrap();
    let drained = queue.drain().unwrap().unwrap();
    assert_eq!(drained.len(), 1);
}

#[test]
fn malformed_queue_file_drains_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mutations.json");
    std::fs::write(&path, "not json").unwrap();
    let queue = MutationQueue::new(&path);
    assert_eq!(queue.drain().unwrap(), Some(Vec::new()));
}
