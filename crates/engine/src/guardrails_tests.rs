use pulse_core::FakeClock;

use super::{GuardrailLimits, Guardrails};

#[test]
fn weight_change_clamps_to_max_delta_then_to_absolute_ceiling() {
    let guardrails = Guardrails::new(GuardrailLimits::default(), FakeClock::new());

    let result = guardrails.validate_weight_change("goals", 1.0, 10.0);
    assert!((result.value - 1.5).abs() < 1e-9);
    assert!(result.clamped);
}

#[test]
fn weight_change_within_delta_is_not_clamped() {
    let guardrails = Guardrails::new(GuardrailLimits::default(), FakeClock::new());

    let result = guardrails.validate_weight_change("goals", 1.0, 1.2);
    assert!((result.value - 1.2).abs() < 1e-9);
    assert!(!result.clamped);
}

#[test]
fn protected_drives_have_a_higher_weight_floor() {
    let guardrails = Guardrails::new(GuardrailLimits::default(), FakeClock::new());

    let result = guardrails.validate_weight_change("curiosity", 0.6, -10.0);
    assert!((result.value - 0.5).abs() < 1e-9);
    assert!(result.clamped);
}

#[test]
fn removing_a_protected_drive_is_rejected() {
    let guardrails = Guardrails::new(GuardrailLimits::default(), FakeClock::new());
    assert!(guardrails.validate_drive_removal("emotions").is_err());
    assert!(guardrails.validate_drive_removal("goals").is_ok());
}

#[test]
fn drive_count_ceiling_is_enforced() {
    let guardrails = Guardrails::new(GuardrailLimits { max_drive_count: 2, ..GuardrailLimits::default() }, FakeClock::new());
    assert!(guardrails.validate_drive_count(1).is_ok());
    assert!(guardrails.validate_drive_count(2).is_err());
}

#[test]
fn mutation_rate_budget_rejects_beyond_the_hourly_ceiling() {
    let mut guardrails =
        Guardrails::new(GuardrailLimits { max_mutations_per_hour: 3, ..GuardrailLimits::default() }, FakeClock::new());
    assert!(guardrails.check_mutation_rate().is_ok());
    assert!(guardrails.check_mutation_rate().is_ok());
    assert!(guardrails.check_mutation_rate().is_ok());
    assert!(guardrails.check_mutation_rate().is_err());
}

#[test]
fn cooldown_and_turns_per_hour_clamp_to_configured_bounds() {
    let guardrails = Guardrails::new(GuardrailLimits::default(), FakeClock::new());

    let cooldown = guardrails.validate_cooldown(-5);
    assert_eq!(cooldown.value, 0);
    assert!(cooldown.clamped);

    let turns = guardrails.validate_turns_per_hour(500);
    assert_eq!(turns.value, 100);
    assert!(turns.clamped);
}
