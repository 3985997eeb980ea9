// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn tick_accumulates_proportional_to_weight_and_elapsed_time() {
    let mut d = Drive::new("goals", "goals", 2.0);
    d.tick(60.0, 1.0, 10.0);
    assert!((d.pressure - 2.0).abs() < 1e-9);
}

#[test]
fn tick_clamps_to_max_pressure() {
    let mut d = Drive::new("goals", "goals", 1.0);
    d.pressure = 9.9;
    d.tick(600.0, 5.0, 10.0);
    assert_eq!(d.pressure, 10.0);
}

#[test]
fn decay_floors_at_zero() {
    let mut d = Drive::new("goals", "goals", 1.0);
    d.pressure = 0.2;
    d.decay(1.0);
    assert_eq!(d.pressure, 0.0);
}

#[test]
fn spike_caps_at_max_pressure() {
    let mut d = Drive::new("system", "system", 1.5);
    d.pressure = 9.8;
    d.spike(0.5, 10.0);
    assert_eq!(d.pressure, 10.0);
}

#[test]
fn weighted_pressure_multiplies_pressure_by_weight() {
    let mut d = Drive::new("curiosity", "curiosity", 1.5);
    d.pressure = 2.0;
    assert!((d.weighted_pressure() - 3.0).abs() < 1e-9);
}

#[test]
fn drive_state_total_pressure_sums_weighted_pressure() {
    let mut a = Drive::new("goals", "goals", 1.0);
    a.pressure = 2.0;
    let mut b = Drive::new("curiosity", "curiosity", 2.0);
    b.pressure = 1.0;
    let state = DriveState::new(vec![a, b], 100);
    assert!((state.total_pressure - 4.0).abs() < 1e-9);
}

#[test]
fn drive_state_top_drive_is_highest_weighted_pressure() {
    let mut a = Drive::new("goals", "goals", 1.0);
    a.pressure = 2.0;
    let mut b = Drive::new("curiosity", "curiosity", 2.0);
    b.pressure = 3.0;
    let state = DriveState::new(vec![a, b], 100);
    assert_eq!(state.top_drive.as_deref(), Some("curiosity"));
    assert!((state.top_weighted_pressure() - 6.0).abs() < 1e-9);
}

#[test]
fn drive_state_with_no_drives_has_zero_pressure_and_no_top() {
    let state = DriveState::new(vec![], 0);
    assert_eq!(state.total_pressure, 0.0);
    assert!(state.top_drive.is_none());
    assert!(state.top_drive().is_none());
}

#[test]
fn pressure_serializes_rounded_to_four_decimals() {
    let mut d = Drive::new("goals", "goals", 1.0);
    d.pressure = 1.0 / 3.0;
    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json["pressure"], serde_json::json!(0.3333));
}
