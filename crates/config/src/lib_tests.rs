// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn missing_path_falls_back_to_defaults() {
    let config = load(Some(Path::new("/nonexistent/pulse.toml"))).unwrap();
    assert_eq!(config.daemon.health_port, 9720);
}

#[test]
fn loads_and_overlays_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulse.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
        [webhook]
        url = "http://example.com/hook"
        max_turns_per_hour = 20

        [drives]
        trigger_threshold = 0.9
        "#
    )
    .unwrap();

    let config = load(Some(&path)).unwrap();
    assert_eq!(config.webhook.url, "http://example.com/hook");
    assert_eq!(config.webhook.max_turns_per_hour, 20);
    assert_eq!(config.drives.trigger_threshold, 0.9);
    // Unset sections keep their defaults.
    assert_eq!(config.daemon.health_port, 9720);
}

#[test]
fn interpolates_webhook_token_from_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulse.toml");
    std::fs::write(&path, "[webhook]\ntoken = \"${PULSE_TEST_CFG_TOKEN}\"\n").unwrap();
    std::env::set_var("PULSE_TEST_CFG_TOKEN", "secret-token");

    let config = load(Some(&path)).unwrap();
    assert_eq!(config.webhook.token, "secret-token");
    std::env::remove_var("PULSE_TEST_CFG_TOKEN");
}

#[test]
fn missing_required_env_var_fails_load() {
    let _guard = ENV_LOCK.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulse.toml");
    std::env::remove_var("PULSE_TEST_CFG_MISSING");
    std::fs::write(&path, "[webhook]\ntoken = \"${PULSE_TEST_CFG_MISSING}\"\n").unwrap();

    let err = load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "PULSE_TEST_CFG_MISSING"));
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulse.toml");
    std::fs::write(&path, "not valid toml [[[").unwrap();

    let err = load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn invalid_values_are_rejected_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulse.toml");
    std::fs::write(&path, "[drives]\npressure_rate = -1.0\n").unwrap();

    let err = load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
