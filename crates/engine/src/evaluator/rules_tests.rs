use pulse_config::RulesConfig;
use pulse_core::{Drive, DriveState, SensorData};
use serde_json::json;

use super::RulesEvaluator;

fn state(pressure: f64, weight: f64) -> DriveState {
    let mut drive = Drive::new("goals", "goals", weight);
    drive.pressure = pressure;
    DriveState::new(vec![drive], 0)
}

#[test]
fn triggers_when_single_drive_exceeds_threshold() {
    let evaluator = RulesEvaluator::new(RulesConfig { single_drive_threshold: 0.5, ..RulesConfig::default() });
    let decision = evaluator.evaluate(&state(0.6, 1.0), &SensorData::new(), 0.7);
    assert!(decision.should_trigger);
}

#[test]
fn does_not_trigger_below_every_threshold() {
    let evaluator = RulesEvaluator::new(RulesConfig { single_drive_threshold: 5.0, combined_threshold: 5.0, ..RulesConfig::default() });
    let decision = evaluator.evaluate(&state(0.1, 1.0), &SensorData::new(), 5.0);
    assert!(!decision.should_trigger);
    assert!(!decision.recommend_generate);
}

#[test]
fn recommends_generate_when_not_triggering_but_above_trigger_threshold() {
    let evaluator = RulesEvaluator::new(RulesConfig { single_drive_threshold: 5.0, combined_threshold: 5.0, ..RulesConfig::default() });
    let decision = evaluator.evaluate(&state(1.0, 1.0), &SensorData::new(), 0.5);
    assert!(!decision.should_trigger);
    assert!(decision.recommend_generate);
}

#[test]
fn conversation_active_suppresses_regardless_of_pressure() {
    let evaluator = RulesEvaluator::new(RulesConfig { single_drive_threshold: 0.1, combined_threshold: 0.1, ..RulesConfig::default() });
    let mut sensor_data = SensorData::new();
    sensor_data.insert("conversation".to_string(), json!({"active": true, "in_cooldown": false}));
    let decision = evaluator.evaluate(&state(5.0, 1.0), &sensor_data, 0.1);
    assert!(!decision.should_trigger);
}
