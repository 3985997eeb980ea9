// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pulse_core::FakeClock;
use std::fs;

fn write_jsonl(dir: &Path, name: &str, bytes: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "x".repeat(bytes)).unwrap();
    path
}

#[tokio::test]
async fn no_session_dir_reports_inactive() {
    let clock = FakeClock::new();
    let mut sensor = ConversationSensor::new(vec![PathBuf::from("/no/such/dir")], 5, clock);
    let value = sensor.read().await.unwrap();
    let reading: ConversationReading = serde_json::from_value(value).unwrap();
    assert!(!reading.active);
    assert!(!reading.in_cooldown);
    assert_eq!(reading.last_human_activity, None);
}

#[tokio::test]
async fn large_recent_transcript_marks_active() {
    let dir = tempfile::tempdir().unwrap();
    write_jsonl(dir.path(), "main.jsonl", 150_000);

    let clock = FakeClock::new();
    let mut sensor = ConversationSensor::new(vec![dir.path().to_path_buf()], 5, clock);
    let value = sensor.read().await.unwrap();
    let reading: ConversationReading = serde_json::from_value(value).unwrap();
    assert!(reading.active);
    assert!(reading.last_human_activity.is_some());
}

#[tokio::test]
async fn small_transcript_is_not_the_main_session() {
    let dir = tempfile::tempdir().unwrap();
    write_jsonl(dir.path(), "hook.jsonl", 500);

    let clock = FakeClock::new();
    let mut sensor = ConversationSensor::new(vec![dir.path().to_path_buf()], 5, clock);
    let value = sensor.read().await.unwrap();
    let reading: ConversationReading = serde_json::from_value(value).unwrap();
    assert!(!reading.active);
}

#[tokio::test]
async fn probe_files_are_ignored_even_if_largest() {
    let dir = tempfile::tempdir().unwrap();
    write_jsonl(dir.path(), "probe-huge.jsonl", 500_000);
    write_jsonl(dir.path(), "main.jsonl", 150_000);

    let clock = FakeClock::new();
    let mut sensor = ConversationSensor::new(vec![dir.path().to_path_buf()], 5, clock);
    let value = sensor.read().await.unwrap();
    let reading: ConversationReading = serde_json::from_value(value).unwrap();
    assert!(reading.active);
}

#[tokio::test]
async fn cooldown_window_follows_last_activity_until_it_elapses() {
    let dir = tempfile::tempdir().unwrap();
    write_jsonl(dir.path(), "main.jsonl", 150_000);

    let clock = FakeClock::new();
    let mut sensor = ConversationSensor::new(vec![dir.path().to_path_buf()], 5, clock.clone());

    let value = sensor.read().await.unwrap();
    let reading: ConversationReading = serde_json::from_value(value).unwrap();
    assert!(reading.active);
    assert!(reading.in_cooldown);

    // Advance past the 120s activity window but still inside the 5 minute cooldown.
    clock.advance(std::time::Duration::from_secs(150));
    let value = sensor.read().await.unwrap();
    let reading: ConversationReading = serde_json::from_value(value).unwrap();
    assert!(!reading.active, "outside the 120s activity window");
    assert!(reading.in_cooldown, "still inside the cooldown window");

    // Advance past the cooldown window entirely.
    clock.advance(std::time::Duration::from_secs(600));
    let value = sensor.read().await.unwrap();
    let reading: ConversationReading = serde_json::from_value(value).unwrap();
    assert!(!reading.in_cooldown);
}

#[tokio::test]
async fn falls_through_to_the_next_candidate_when_the_first_has_no_qualifying_transcript() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    // `first` exists but has no transcript over the 100KB threshold, so the
    // search must continue to `second`, which does.
    write_jsonl(first.path(), "hook.jsonl", 500);
    write_jsonl(second.path(), "main.jsonl", 150_000);

    let clock = FakeClock::new();
    let mut sensor =
        ConversationSensor::new(vec![first.path().to_path_buf(), second.path().to_path_buf()], 5, clock);
    let value = sensor.read().await.unwrap();
    let reading: ConversationReading = serde_json::from_value(value).unwrap();
    assert!(reading.active);
}

#[tokio::test]
async fn stops_at_the_first_candidate_that_does_qualify() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write_jsonl(first.path(), "main.jsonl", 150_000);
    write_jsonl(second.path(), "main.jsonl", 150_000);

    let clock = FakeClock::new();
    let mut sensor =
        ConversationSensor::new(vec![first.path().to_path_buf(), second.path().to_path_buf()], 5, clock);
    let value = sensor.read().await.unwrap();
    let reading: ConversationReading = serde_json::from_value(value).unwrap();
    assert!(reading.active);
}
