// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn glob_ignore_pattern_matches_filename() {
    let locked = Mutex::new(HashSet::new());
    let path = Path::new("/tmp/workspace/.git/index");
    assert!(should_ignore(path, &["*.git*".to_string()], false, &locked));
}

#[test]
fn substring_ignore_pattern_matches_full_path() {
    let locked = Mutex::new(HashSet::new());
    let path = Path::new("/tmp/workspace/target/debug/build");
    assert!(should_ignore(path, &["/target/".to_string()], false, &locked));
}

#[test]
fn unmatched_pattern_does_not_ignore() {
    let locked = Mutex::new(HashSet::new());
    let path = Path::new("/tmp/workspace/notes.md");
    assert!(!should_ignore(path, &["*.git*".to_string()], false, &locked));
}

#[test]
fn self_write_path_is_ignored_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("state.json");
    std::fs::write(&file, "{}").unwrap();
    let resolved = file.canonicalize().unwrap();

    let locked = Mutex::new(HashSet::from([resolved]));
    assert!(should_ignore(&file, &[], true, &locked), "first match should be suppressed");
    assert!(!should_ignore(&file, &[], true, &locked), "entry should be consumed after one match");
}

#[test]
fn handle_marks_path_that_sensor_later_ignores() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("state.json");
    std::fs::write(&file, "{}").unwrap();

    let (_, handle) = FilesystemSensor::new(vec![dir.path().to_path_buf()], Vec::new(), true);
    handle.mark_self_write(&file);

    assert!(should_ignore(&file, &[], true, &handle.self_write_paths));
}

#[tokio::test]
async fn watcher_reports_a_created_file() {
    let dir = tempfile::tempdir().unwrap();
    let (mut sensor, _handle) =
        FilesystemSensor::new(vec![dir.path().to_path_buf()], Vec::new(), false);
    sensor.initialize().await.unwrap();

    let file = dir.path().join("new-file.txt");
    std::fs::write(&file, "hello").unwrap();

    // Native watcher backends deliver events asynchronously; poll briefly.
    let mut seen = false;
    for _ in 0..20 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let value = sensor.read().await.unwrap();
        let reading: FilesystemReading = serde_json::from_value(value).unwrap();
        if !reading.changes.is_empty() {
            seen = true;
            break;
        }
    }
    assert!(seen, "expected at least one filesystem change to be reported");
    sensor.stop().await.unwrap();
}
