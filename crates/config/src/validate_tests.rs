// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_config_is_valid() {
    validate(&PulseConfig::default()).unwrap();
}

#[test]
fn rejects_non_positive_pressure_rate() {
    let mut cfg = PulseConfig::default();
    cfg.drives.pressure_rate = 0.0;
    let err = validate(&cfg).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("pressure_rate")));
}

#[test]
fn rejects_zero_health_port() {
    let mut cfg = PulseConfig::default();
    cfg.daemon.health_port = 0;
    assert!(validate(&cfg).is_err());
}

#[test]
fn rejects_unknown_evaluator_mode() {
    let mut cfg = PulseConfig::default();
    cfg.evaluator.mode = "vibes".to_string();
    let err = validate(&cfg).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("evaluator.mode")));
}

#[test]
fn collects_multiple_errors_at_once() {
    let mut cfg = PulseConfig::default();
    cfg.drives.pressure_rate = -1.0;
    cfg.daemon.loop_interval_seconds = 0;
    let err = validate(&cfg).unwrap_err();
    match err {
        ConfigError::Invalid(msg) => {
            assert!(msg.contains("pressure_rate"));
            assert!(msg.contains("loop_interval_seconds"));
        }
        _ => panic!("expected Invalid"),
    }
}

#[test]
fn empty_token_warns_but_does_not_fail() {
    let mut cfg = PulseConfig::default();
    cfg.webhook.token = String::new();
    validate(&cfg).unwrap();
}
