use tempfile::TempDir;

use super::PidLock;

#[test]
fn acquire_writes_current_pid() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pulse.pid");

    let lock = PidLock::acquire(&path).expect("first lock succeeds");
    let contents = std::fs::read_to_string(&path).expect("pid file exists");
    assert_eq!(contents.trim(), std::process::id().to_string());
    drop(lock);
}

#[test]
fn second_acquire_fails_while_first_is_held() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pulse.pid");

    let _lock = PidLock::acquire(&path).expect("first lock succeeds");
    let second = PidLock::acquire(&path);
    assert!(second.is_err());
}

#[test]
fn drop_releases_lock_and_removes_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pulse.pid");

    let lock = PidLock::acquire(&path).expect("first lock succeeds");
    drop(lock);
    assert!(!path.exists());

    let reacquired = PidLock::acquire(&path);
    assert!(reacquired.is_ok());
}

#[test]
fn stale_pid_file_is_removed_and_retried() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("pulse.pid");
    // A PID that (almost certainly) does not correspond to a running process.
    std::fs::write(&path, "999999999\n").expect("write stale pid");

    let lock = PidLock::acquire(&path);
    assert!(lock.is_ok());
}
