// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Trigger Dispatcher: rate-limits, builds the trigger message via the
//! pluggable [`Integration`], fires the webhook, and records the outcome.
//! HTTP client grounded on `UpstreamClient`/`LlmDriver`'s
//! build-once-`reqwest::Client` pattern.

use std::collections::VecDeque;
use std::time::Duration;

use pulse_config::{DrivesConfig, WebhookConfig};
use pulse_core::{Clock, InternalEventKind, TriggerDecision};
use pulse_storage::{TriggerHistoryEntry, TriggerHistoryLog};
use serde_json::json;

use crate::drive_engine::DriveEngine;
use crate::error::EngineError;

/// Builds the webhook body from a [`TriggerDecision`]. External collaborator
/// per spec.md §6 — Pulse ships only a default implementation.
pub trait Integration: Send + Sync {
    fn build_trigger_message(&self, decision: &TriggerDecision, config: &WebhookConfig) -> String;
}

/// Plain-text composition: prefix, reason, and top-drive focus hint.
pub struct DefaultIntegration;

impl Integration for DefaultIntegration {
    fn build_trigger_message(&self, decision: &TriggerDecision, config: &WebhookConfig) -> String {
        let mut message = format!("{} {}", config.message_prefix, decision.reason);
        if let Some(drive) = &decision.top_drive {
            message.push_str(&format!(" (focus: {drive})"));
        }
        if let Some(context) = &decision.sensor_context {
            message.push_str(&format!(" — {context}"));
        }
        message
    }
}

/// Receives internal lifecycle events for side-effect decoupling
/// (`pulse-daemon`'s in-process `EventBus` implements this); defined here so
/// the Dispatcher doesn't depend on the daemon crate.
pub trait EventSink {
    fn emit(&self, kind: InternalEventKind);
}

/// An `EventSink` that drops every event — used where no daemon-level bus
/// has been wired up yet (e.g. isolated engine tests).
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _kind: InternalEventKind) {}
}

pub struct TriggerDispatcher<C: Clock> {
    client: reqwest::Client,
    clock: C,
    history_log: TriggerHistoryLog,
    integration: Box<dyn Integration>,
    last_trigger: u64,
    turn_window: VecDeque<u64>,
    turn_count: u64,
}

impl<C: Clock> TriggerDispatcher<C> {
    pub fn new(clock: C, history_log: TriggerHistoryLog, integration: Box<dyn Integration>) -> Self {
        Self {
            client: reqwest::Client::builder().timeout(Duration::from_secs(10)).build().expect("valid client config"),
            clock,
            history_log,
            integration,
            last_trigger: 0,
            turn_window: VecDeque::new(),
            turn_count: 0,
        }
    }

    pub fn turn_count(&self) -> u64 {
        self.turn_count
    }

    /// Epoch seconds of the last dispatched trigger, `0` if none yet —
    /// backs the Daemon Loop's high-pressure override idle check.
    pub fn last_trigger(&self) -> u64 {
        self.last_trigger
    }

    pub fn can_trigger(&mut self, config: &WebhookConfig) -> bool {
        let now = self.clock.epoch_secs();
        self.prune_window(now);
        let interval_ok = now.saturating_sub(self.last_trigger) >= config.min_trigger_interval;
        let rate_ok = (self.turn_window.len() as u32) < config.max_turns_per_hour;
        interval_ok && rate_ok
    }

    fn prune_window(&mut self, now: u64) {
        while let Some(&oldest) = self.turn_window.front() {
            if now.saturating_sub(oldest) > 3600 {
                self.turn_window.pop_front();
            } else {
                break;
            }
        }
    }

    /// Dispatch a trigger. Returns whether the webhook call succeeded; a
    /// network failure or non-2xx response is a failed trigger, not an
    /// `Err` — per spec.md §7, dispatch failures are recoverable and feed
    /// `DriveEngine::on_trigger_failure`.
    pub async fn dispatch(
        &mut self,
        decision: &TriggerDecision,
        webhook_config: &WebhookConfig,
        drives_config: &DrivesConfig,
        drive_engine: &mut DriveEngine<C>,
        sink: &dyn EventSink,
    ) -> Result<bool, EngineError> {
        let message = self.integration.build_trigger_message(decision, webhook_config);
        let success = if webhook_config.deliver {
            self.post_webhook(&message, webhook_config).await
        } else {
            tracing::debug!("webhook delivery disabled, treating as success");
            true
        };

        let now = self.clock.epoch_secs();
        self.last_trigger = now;
        self.turn_window.push_back(now);
        self.turn_count += 1;

        if success {
            drive_engine.on_trigger_success(drives_config, decision);
            sink.emit(InternalEventKind::TriggerSuccess);
        } else {
            drive_engine.on_trigger_failure(drives_config, decision);
            sink.emit(InternalEventKind::TriggerFailure);
        }

        self.history_log.append(&TriggerHistoryEntry {
            ts: now,
            outcome: if success { "success".to_string() } else { "failure".to_string() },
            reason: decision.reason.clone(),
            top_drive: decision.top_drive.clone(),
            total_pressure: decision.total_pressure,
        })?;

        Ok(success)
    }

    async fn post_webhook(&self, message: &str, config: &WebhookConfig) -> bool {
        let result = self
            .client
            .post(&config.url)
            .bearer_auth(&config.token)
            .json(&json!({ "message": message }))
            .send()
            .await;
        match result {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!(error = %err, "webhook dispatch failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
