// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Daemon Loop: startup wiring plus the tick-by-tick cognitive loop.
//! Tick sequencing is grounded line-for-line on `original_source`'s
//! `PulseDaemon._main_loop`/`_trigger_turn`/`_process_feedback_file`/
//! `_can_trigger` — SENSE, ENRICH (pre_sense), DRIVE.tick, ENRICH
//! (pre_evaluate), EVALUATE, the hard high-pressure override, the hard
//! conversation suppression, TRIGGER-or-GENERATE-hint, FEEDBACK INTAKE,
//! MUTATE, POST-LOOP, PERSIST. Signal handling and the health-surface spawn
//! follow `coop`'s `run.rs`: first SIGTERM/SIGINT cancels a shared
//! `CancellationToken`, a second one forces `std::process::exit(130)`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use pulse_config::{expand_tilde, PulseConfig, WorkspaceConfig};
use pulse_core::{Clock, ConversationReading, DriveState, SystemClock};
use pulse_engine::{
    ConfigOverrides, DefaultIntegration, DriveEngine, Evaluator, EventSink, GuardrailLimits, Guardrails, Mutator,
    OutcomeRecord, Plasticity, PlasticityLimits, TriggerDispatcher,
};
use pulse_sensors::{ConversationSensor, FilesystemSensor, SensorManager, SystemSensor};
use pulse_storage::{BroadcastBus, MutationLog, MutationQueue, StateStore, TriggerHistoryLog};
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::DaemonError;
use crate::event_bus::EventBus;
use crate::feedback::{apply_feedback, take_dropped_feedback};
use crate::health::{self, FeedbackRequest, HealthState, StatusSnapshot};
use crate::hooks::{guarded, Hook, HookContext};
use crate::pid_lock::PidLock;
use crate::state::{GenerateHint, PulseState};

const FEEDBACK_CHANNEL_CAPACITY: usize = 8;
/// Every evaluation outcome is recorded with this neutral quality score —
/// `original_source`'s `post_trigger` hook does the same, noting it as "a
/// neutral default, updated by feedback" since no per-turn quality signal
/// exists outside the hosting agent's own judgment.
const PLASTICITY_NEUTRAL_QUALITY: f64 = 0.5;
const PLASTICITY_NEUTRAL_LOOP_AVERAGE: f64 = 5.0;

struct Paths {
    state_dir: PathBuf,
    pid_file: PathBuf,
    pulse_state: PathBuf,
    drive_performance: PathBuf,
    broadcast: PathBuf,
    trigger_history: PathBuf,
    mutation_queue: PathBuf,
    mutation_log: PathBuf,
}

impl Paths {
    fn new(config: &PulseConfig) -> Self {
        let state_dir = expand_tilde(&config.state.dir);
        Self {
            pid_file: expand_tilde(&config.daemon.pid_file),
            pulse_state: state_dir.join("pulse-state.json"),
            drive_performance: state_dir.join("drive-performance.json"),
            broadcast: state_dir.join("broadcast.jsonl"),
            trigger_history: state_dir.join("trigger-history.jsonl"),
            mutation_queue: state_dir.join("mutations.json"),
            mutation_log: state_dir.join("mutations.jsonl"),
            state_dir,
        }
    }
}

fn apply_overrides(overrides: &ConfigOverrides, drives: &mut pulse_config::DrivesConfig, webhook: &mut pulse_config::WebhookConfig) {
    if let Some(value) = overrides.trigger_threshold {
        drives.trigger_threshold = value;
    }
    if let Some(value) = overrides.pressure_rate {
        drives.pressure_rate = value;
    }
    if let Some(value) = overrides.min_trigger_interval {
        webhook.min_trigger_interval = value.max(0) as u64;
    }
    if let Some(value) = overrides.max_turns_per_hour {
        webhook.max_turns_per_hour = value.max(0) as u32;
    }
}

fn load_working_memory(workspace: &WorkspaceConfig) -> Option<serde_json::Value> {
    let path = workspace.resolve_path(&workspace.working_memory);
    let raw = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

fn read_conversation(sensor_data: &pulse_core::SensorData) -> ConversationReading {
    sensor_data
        .get("conversation")
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}

/// The two hardcoded candidate session directories the conversation sensor
/// inspects, matching `original_source`'s `SensorManager.read`
/// `main_session_candidates` — Pulse has no config field for this since the
/// original never exposed one either.
fn session_dirs() -> Vec<PathBuf> {
    vec![expand_tilde("~/.openclaw/workspace"), expand_tilde("~/.openclaw/agents/main/sessions")]
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async { if let Some(s) = sigterm.as_mut() { s.recv().await } else { std::future::pending().await } } => {
                info!("received SIGTERM");
            }
            _ = async { if let Some(s) = sigint.as_mut() { s.recv().await } else { std::future::pending().await } } => {
                info!("received SIGINT");
            }
        }
        shutdown.cancel();

        tokio::select! {
            _ = async { if let Some(s) = sigterm.as_mut() { s.recv().await } else { std::future::pending().await } } => {
                info!("received SIGTERM again, forcing exit");
            }
            _ = async { if let Some(s) = sigint.as_mut() { s.recv().await } else { std::future::pending().await } } => {
                info!("received SIGINT again, forcing exit");
            }
        }
        std::process::exit(130);
    });
}

/// Entry point for the `pulse start` CLI command. Acquires the
/// single-instance PID lock, wires every component, and runs the cognitive
/// loop until a shutdown signal arrives.
pub async fn run(config: PulseConfig, hook: Box<dyn Hook>) -> Result<(), DaemonError> {
    let paths = Paths::new(&config);
    let _pid_lock = PidLock::acquire(&paths.pid_file)?;
    let clock = SystemClock;

    std::fs::create_dir_all(&paths.state_dir)
        .map_err(|source| DaemonError::Io { path: paths.state_dir.clone(), source })?;

    let state_store = StateStore::new(paths.pulse_state.clone(), config.state.save_interval, clock.clone());
    let pulse_state: PulseState = state_store.load();

    let mut drives_config = config.drives.clone();
    let mut webhook_config = config.webhook.clone();
    let mut overrides = pulse_state.config_overrides.clone();
    apply_overrides(&overrides, &mut drives_config, &mut webhook_config);

    let mut drive_engine = DriveEngine::new(&config.drives, webhook_config.min_trigger_interval, clock.clone());
    drive_engine.restore_state(&pulse_state.drives);

    let performance_store = StateStore::new(paths.drive_performance.clone(), config.state.save_interval, clock.clone());
    let mut plasticity = Plasticity::new(PlasticityLimits::default(), MutationLog::new(paths.mutation_log.clone()), clock.clone());
    let saved_history: HashMap<String, std::collections::VecDeque<OutcomeRecord>> = performance_store.load();
    plasticity.restore_history(saved_history);

    let guardrails = Guardrails::new(GuardrailLimits::default(), clock.clone());
    let mut mutator =
        Mutator::new(guardrails, MutationLog::new(paths.mutation_log.clone()), clock.clone(), config.drives.max_pressure);
    let mutation_queue = MutationQueue::new(paths.mutation_queue.clone());

    let broadcast_bus = BroadcastBus::new(paths.broadcast.clone());
    let event_bus = EventBus::new(broadcast_bus, clock.clone());

    let trigger_history_log = TriggerHistoryLog::new(paths.trigger_history.clone());
    let mut dispatcher = TriggerDispatcher::new(clock.clone(), trigger_history_log, Box::new(DefaultIntegration));

    let mut evaluator = Evaluator::new(&config.evaluator, clock.clone());

    let sensors = Arc::new(SensorManager::new());
    if config.sensors.filesystem.enabled {
        let watch_paths = config.sensors.filesystem.watch_paths.iter().map(PathBuf::from).collect();
        let (fs_sensor, _handle) = FilesystemSensor::new(
            watch_paths,
            config.sensors.filesystem.ignore_patterns.clone(),
            config.sensors.filesystem.ignore_self_writes,
        );
        sensors.add_sensor(Box::new(fs_sensor));
    }
    sensors.add_sensor(Box::new(ConversationSensor::new(
        session_dirs(),
        config.evaluator.rules.conversation_cooldown_minutes as u64,
        clock.clone(),
    )));
    if config.sensors.system.enabled {
        sensors.add_sensor(Box::new(SystemSensor::new(
            config.sensors.system.memory_threshold_percent,
            config.sensors.system.watch_processes.clone(),
        )));
    }
    sensors.start().await;

    let (feedback_tx, mut feedback_rx) = mpsc::channel::<FeedbackRequest>(FEEDBACK_CHANNEL_CAPACITY);
    let status = Arc::new(RwLock::new(StatusSnapshot::starting(
        drives_config.trigger_threshold,
        drives_config.pressure_rate,
        webhook_config.min_trigger_interval,
        webhook_config.max_turns_per_hour,
    )));
    let health_state = Arc::new(HealthState {
        status: Arc::clone(&status),
        mutations: MutationLog::new(paths.mutation_log.clone()),
        feedback_tx,
        started_at: clock.epoch_secs(),
    });
    let router = health::build_router(Arc::clone(&health_state));
    let shutdown = CancellationToken::new();
    let health_addr: SocketAddr = format!("127.0.0.1:{}", config.daemon.health_port)
        .parse()
        .map_err(|_| DaemonError::Health(std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid health_port")))?;
    {
        let sd = shutdown.clone();
        tokio::spawn(async move {
            if let Err(err) = health::serve(health_addr, router, sd).await {
                error!(error = %err, "health surface exited with error");
            }
        });
    }
    spawn_signal_handler(shutdown.clone());

    info!(
        loop_interval = config.daemon.loop_interval_seconds,
        trigger_threshold = drives_config.trigger_threshold,
        health_port = config.daemon.health_port,
        "pulse daemon online"
    );

    let mut last_generate = 0u64;
    let mut pulse_state = pulse_state;

    while !shutdown.is_cancelled() {
        let tick_start = clock.now();

        // SENSE
        let sensor_data = sensors.read().await;

        // ENRICH (pre_sense) + DRIVE.tick
        drive_engine.refresh_sources(&drives_config, &config.workspace);
        let pre_tick_state = DriveState::new(drive_engine.drives().cloned().collect(), clock.epoch_secs());
        guarded(
            "pre_sense",
            std::panic::AssertUnwindSafe(|| hook.pre_sense(&HookContext { drives: &pre_tick_state, readings: &sensor_data })),
        );
        let drive_state = drive_engine.tick(&drives_config, &sensor_data);

        // ENRICH (pre_evaluate)
        guarded(
            "pre_evaluate",
            std::panic::AssertUnwindSafe(|| hook.pre_evaluate(&HookContext { drives: &drive_state, readings: &sensor_data })),
        );

        // EVALUATE
        let working_memory = load_working_memory(&config.workspace);
        let mut decision = evaluator
            .evaluate(&drive_state, &sensor_data, working_memory.as_ref(), &config.evaluator, drives_config.trigger_threshold)
            .await;

        // Hard high-pressure override: the model/rules gate cannot suppress this.
        if !decision.should_trigger && drive_state.total_pressure > 10.0 {
            let max_individual = drive_state.top_weighted_pressure();
            let idle_secs = clock.epoch_secs().saturating_sub(dispatcher.last_trigger());
            if idle_secs > 1800 && max_individual > drives_config.override_min_individual_pressure {
                info!(
                    total_pressure = drive_state.total_pressure,
                    max_individual, idle_secs, "high-pressure override forcing trigger"
                );
                decision.should_trigger = true;
                decision.reason = format!(
                    "high_pressure_override: pressure={:.1}, max_individual={:.2}, idle={idle_secs}s",
                    drive_state.total_pressure, max_individual
                );
            }
        }

        // Hard conversation suppression: runs after the override so an active
        // conversation always wins, even over a forced high-pressure trigger.
        let conversation = read_conversation(&sensor_data);
        if conversation.active && decision.should_trigger {
            info!(seconds_since = ?conversation.seconds_since, "trigger suppressed — human conversation active");
            decision.should_trigger = false;
        }

        let mut triggered = false;
        if decision.should_trigger {
            if dispatcher.can_trigger(&webhook_config) {
                let success = dispatcher
                    .dispatch(&decision, &webhook_config, &drives_config, &mut drive_engine, &event_bus)
                    .await?;
                evaluator.record_trigger_history(pulse_storage::TriggerHistoryEntry {
                    ts: clock.epoch_secs(),
                    outcome: if success { "success".to_string() } else { "failure".to_string() },
                    reason: decision.reason.clone(),
                    top_drive: decision.top_drive.clone(),
                    total_pressure: decision.total_pressure,
                });
                if let Some(top_drive) = decision.top_drive.clone() {
                    let should_evolve = plasticity.record(
                        &top_drive,
                        OutcomeRecord {
                            success,
                            quality_score: PLASTICITY_NEUTRAL_QUALITY,
                            loop_average: PLASTICITY_NEUTRAL_LOOP_AVERAGE,
                            context: decision.reason.clone(),
                        },
                    );
                    if should_evolve {
                        let current_weights: HashMap<String, f64> =
                            drive_engine.drives().map(|d| (d.name.clone(), d.weight)).collect();
                        match plasticity.evolve(&current_weights) {
                            Ok(changes) => {
                                for change in changes {
                                    if let Some(drive) = drive_engine.drive_mut(&change.drive) {
                                        drive.weight = change.after;
                                    }
                                    info!(drive = %change.drive, before = change.before, after = change.after, "drive weight evolved");
                                }
                            }
                            Err(err) => warn!(error = %err, "plasticity evolution failed"),
                        }
                        performance_store.request_save();
                        performance_store.maybe_save(&plasticity.save_history())?;
                    }
                }
                triggered = true;
            } else {
                tracing::debug!(total_pressure = decision.total_pressure, "trigger suppressed — rate limit or cooldown");
            }
        }
        guarded(
            "post_trigger",
            std::panic::AssertUnwindSafe(|| {
                hook.post_trigger(&HookContext { drives: &drive_state, readings: &sensor_data }, triggered)
            }),
        );

        // GENERATE-hint: annotate state instead of invoking the out-of-scope
        // generative task-synthesis helper.
        if !decision.should_trigger && decision.recommend_generate && config.generative.enabled {
            let now = clock.epoch_secs();
            let min_idle = config.generative.min_idle_minutes as u64 * 60;
            if now.saturating_sub(last_generate) >= min_idle {
                last_generate = now;
                pulse_state.generate_hint = Some(GenerateHint {
                    ts: now,
                    top_drive: decision.top_drive.clone(),
                    total_pressure: decision.total_pressure,
                });
            }
        }

        // FEEDBACK INTAKE — file-drop channel first, then any pending HTTP requests.
        if let Some(message) = take_dropped_feedback(&paths.state_dir) {
            apply_feedback(&mut drive_engine, &message, clock.epoch_secs());
        }
        while let Ok((message, respond_to)) = feedback_rx.try_recv() {
            let updated = apply_feedback(&mut drive_engine, &message, clock.epoch_secs());
            let _ = respond_to.send(updated);
        }

        // MUTATE
        if let Some(commands) = mutation_queue.drain()? {
            if !commands.is_empty() {
                let outcomes = mutator.apply_batch(commands, &mut drive_engine, &mut overrides)?;
                let applied = outcomes.iter().filter(|o| o.is_applied()).count();
                if applied > 0 {
                    info!(applied, total = outcomes.len(), "mutations processed");
                    for outcome in &outcomes {
                        if outcome.is_applied() {
                            event_bus.emit(pulse_core::InternalEventKind::MutationApplied);
                        }
                    }
                    apply_overrides(&overrides, &mut drives_config, &mut webhook_config);
                    pulse_state.config_overrides = overrides.clone();
                    pulse_state.drives = drive_engine.save_state();
                    state_store.request_save();
                }
            }
        }

        // POST-LOOP housekeeping + night mode.
        guarded(
            "post_loop",
            std::panic::AssertUnwindSafe(|| hook.post_loop(&HookContext { drives: &drive_state, readings: &sensor_data })),
        );
        if hook.check_night_mode() == crate::hooks::NightModeStatus::Active {
            guarded("run_rem_session", std::panic::AssertUnwindSafe(|| hook.run_rem_session()));
        }

        // PERSIST
        {
            let mut status = status.write().await;
            *status = StatusSnapshot {
                turn_count: dispatcher.turn_count(),
                drive_state: drive_state.clone(),
                evaluator: evaluator.status(),
                can_trigger: dispatcher.can_trigger(&webhook_config),
                trigger_threshold: drives_config.trigger_threshold,
                pressure_rate: drives_config.pressure_rate,
                min_trigger_interval: webhook_config.min_trigger_interval,
                max_turns_per_hour: webhook_config.max_turns_per_hour,
                config_overrides: overrides.clone(),
            };
        }
        pulse_state.drives = drive_engine.save_state();
        pulse_state.saved_at_ms = clock.epoch_secs() * 1000;
        state_store.maybe_save(&pulse_state)?;

        let elapsed = clock.now().duration_since(tick_start);
        let interval = std::time::Duration::from_secs(config.daemon.loop_interval_seconds);
        let sleep_for = interval.saturating_sub(elapsed);
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(sleep_for) => {}
        }
    }

    info!("shutting down — stopping sensors and persisting final state");
    sensors.stop().await;
    state_store.request_save();
    state_store.maybe_save(&pulse_state)?;
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
