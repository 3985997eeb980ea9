use std::sync::atomic::{AtomicBool, Ordering};

use pulse_core::{DriveState, SensorData};

use super::{guarded, Hook, HookContext, NightModeStatus, NoopHook};

#[test]
fn noop_hook_never_signals_night_mode() {
    let hook = NoopHook;
    assert_eq!(hook.check_night_mode(), NightModeStatus::Inactive);
}

#[test]
fn default_methods_are_callable_without_a_custom_implementation() {
    let hook = NoopHook;
    let drives = DriveState::new(Vec::new(), 0);
    let readings = SensorData::new();
    let ctx = HookContext { drives: &drives, readings: &readings };

    hook.pre_sense(&ctx);
    hook.pre_evaluate(&ctx);
    hook.post_trigger(&ctx, true);
    hook.post_loop(&ctx);
    hook.run_rem_session();
}

#[test]
fn guarded_converts_a_panic_into_a_logged_error_instead_of_propagating() {
    let ran_before = AtomicBool::new(false);
    guarded("pre_sense", || {
        ran_before.store(true, Ordering::SeqCst);
        panic!("simulated hook failure");
    });
    assert!(ran_before.load(Ordering::SeqCst));
}

#[test]
fn guarded_runs_a_well_behaved_hook_to_completion() {
    let ran = AtomicBool::new(false);
    guarded("post_loop", || {
        ran.store(true, Ordering::SeqCst);
    });
    assert!(ran.load(Ordering::SeqCst));
}
