// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Mutex;

// env::set_var is process-global; serialize these tests so they don't race.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn leaves_plain_strings_untouched() {
    let _guard = ENV_LOCK.lock().unwrap();
    assert_eq!(resolve("plain text", false).unwrap(), "plain text");
}

#[test]
fn substitutes_full_string_var() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::set_var("PULSE_TEST_TOKEN", "secret123");
    assert_eq!(resolve("${PULSE_TEST_TOKEN}", true).unwrap(), "secret123");
    std::env::remove_var("PULSE_TEST_TOKEN");
}

#[test]
fn substitutes_inline_var_with_prefix_and_suffix() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::set_var("PULSE_TEST_HOST", "example.com");
    assert_eq!(resolve("https://${PULSE_TEST_HOST}/v1", false).unwrap(), "https://example.com/v1");
    std::env::remove_var("PULSE_TEST_HOST");
}

#[test]
fn missing_optional_var_is_left_literal() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::remove_var("PULSE_TEST_MISSING");
    assert_eq!(resolve("${PULSE_TEST_MISSING}", false).unwrap(), "${PULSE_TEST_MISSING}");
}

#[test]
fn missing_required_var_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::remove_var("PULSE_TEST_MISSING");
    let err = resolve("${PULSE_TEST_MISSING}", true).unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "PULSE_TEST_MISSING"));
}

#[test]
fn multiple_vars_in_one_string() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::set_var("PULSE_TEST_A", "foo");
    std::env::set_var("PULSE_TEST_B", "bar");
    assert_eq!(resolve("${PULSE_TEST_A}-${PULSE_TEST_B}", false).unwrap(), "foo-bar");
    std::env::remove_var("PULSE_TEST_A");
    std::env::remove_var("PULSE_TEST_B");
}
