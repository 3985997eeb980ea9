// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Model evaluator: an LLM-powered gate. Grounded on
//! `mechos-runtime::llm_driver::LlmDriver`'s OpenAI-compatible client
//! pattern, and on `original_source/src/evaluator/model.py` for the prompt
//! shape, failure-fallback bookkeeping, and response parsing.

use std::collections::VecDeque;
use std::time::Duration;

use pulse_config::{ModelEvalConfig, RulesConfig};
use pulse_core::{Clock, DriveState, SensorData, TriggerDecision};
use pulse_storage::TriggerHistoryEntry;
use serde::Deserialize;
use serde_json::json;

use super::rules::RulesEvaluator;
use crate::error::EngineError;

const MAX_CONSECUTIVE_FAILURES: u32 = 3;
const FALLBACK_COOLDOWN_SECS: u64 = 300;
const MAX_HISTORY: usize = 20;

const SYSTEM_PROMPT: &str = r#"You are the priority evaluator for an autonomous AI agent.
Your ONLY job is to decide: should the agent wake up and think right now?

You will receive drive states, sensor readings, recent trigger history, and
working memory. Respond with ONLY valid JSON (no markdown, no explanation):
{
  "trigger": true/false,
  "reason": "brief explanation (1 sentence)",
  "urgency": 0.0-1.0,
  "suggested_focus": "what the agent should focus on if triggered",
  "suppress_minutes": 0
}

trigger=false is the default. Only trigger when there is a specific,
actionable task. Sensor changes are the strongest trigger signal; pure time
passage with no new information should suppress, not trigger."#;

#[derive(Debug, Deserialize)]
struct ModelResponse {
    #[serde(default)]
    trigger: bool,
    #[serde(default = "default_reason")]
    reason: String,
    #[serde(default)]
    suggested_focus: String,
    #[serde(default)]
    suppress_minutes: i64,
}

fn default_reason() -> String {
    "model decision".to_string()
}

pub struct ModelEvaluator<C: Clock> {
    config: ModelEvalConfig,
    client: reqwest::Client,
    clock: C,
    consecutive_failures: u32,
    last_failure_at: u64,
    suppress_until: u64,
    history: VecDeque<TriggerHistoryEntry>,
}

impl<C: Clock> ModelEvaluator<C> {
    pub fn new(config: ModelEvalConfig, clock: C) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("reqwest client construction is infallible with these settings");
        Self {
            config,
            client,
            clock,
            consecutive_failures: 0,
            last_failure_at: 0,
            suppress_until: 0,
            history: VecDeque::with_capacity(MAX_HISTORY),
        }
    }

    /// Consecutive failed calls since the last success — the Health Surface
    /// reports this so operators can see the model evaluator degrading
    /// without log-mining (spec.md §7).
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Epoch seconds until which any `suppress_minutes` response is still
    /// honored, or `0` if not currently suppressed.
    pub fn suppressed_until(&self) -> u64 {
        self.suppress_until
    }

    /// Bounded presentation-only context, distinct from the State Store's
    /// authoritative `trigger-history.jsonl`.
    pub fn record_trigger_history(&mut self, entry: TriggerHistoryEntry) {
        self.history.push_back(entry);
        while self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
    }

    pub async fn evaluate(
        &mut self,
        drive_state: &DriveState,
        sensor_data: &SensorData,
        working_memory: Option<&serde_json::Value>,
        rules_config: &RulesConfig,
        trigger_threshold: f64,
    ) -> TriggerDecision {
        let now = self.clock.epoch_secs();

        if now < self.suppress_until {
            return TriggerDecision::no_trigger(
                format!("model_suppressed (until {}s)", self.suppress_until - now),
                drive_state.total_pressure,
                drive_state.top_drive.clone(),
            );
        }

        if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            if now.saturating_sub(self.last_failure_at) < FALLBACK_COOLDOWN_SECS {
                return self.fallback(drive_state, sensor_data, rules_config, trigger_threshold);
            }
            tracing::info!("retrying model evaluator after cooldown");
        }

        let prompt = self.build_prompt(drive_state, sensor_data, working_memory);
        match self.call_model(&prompt).await {
            Ok(content) => {
                self.consecutive_failures = 0;
                match parse_response(&content) {
                    Ok(parsed) => {
                        let suppress_min = parsed.suppress_minutes.clamp(0, self.config.max_suppress_minutes as i64);
                        if suppress_min > 0 && !parsed.trigger {
                            self.suppress_until = now + (suppress_min as u64 * 60);
                        }
                        let recommend_generate = !parsed.trigger && drive_state.total_pressure >= trigger_threshold;
                        let reason = if parsed.trigger && !parsed.suggested_focus.is_empty() {
                            format!("model: {} → Focus: {}", parsed.reason, parsed.suggested_focus)
                        } else {
                            format!("model: {}", parsed.reason)
                        };
                        let mut decision = if parsed.trigger {
                            TriggerDecision::trigger(reason, drive_state.total_pressure, drive_state.top_drive.clone())
                        } else {
                            TriggerDecision::no_trigger(reason, drive_state.total_pressure, drive_state.top_drive.clone())
                        };
                        if !parsed.suggested_focus.is_empty() {
                            decision = decision.with_sensor_context(parsed.suggested_focus);
                        }
                        if recommend_generate {
                            decision = decision.recommending_generate();
                        }
                        decision
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "model returned invalid JSON");
                        self.record_failure(now);
                        self.fallback(drive_state, sensor_data, rules_config, trigger_threshold)
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, failures = self.consecutive_failures + 1, "model evaluator call failed");
                self.record_failure(now);
                self.fallback(drive_state, sensor_data, rules_config, trigger_threshold)
            }
        }
    }

    fn record_failure(&mut self, now: u64) {
        self.consecutive_failures += 1;
        self.last_failure_at = now;
    }

    fn fallback(
        &self,
        drive_state: &DriveState,
        sensor_data: &SensorData,
        rules_config: &RulesConfig,
        trigger_threshold: f64,
    ) -> TriggerDecision {
        if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            tracing::warn!("model evaluator degraded, using rules fallback");
        }
        let decision = RulesEvaluator::new(rules_config.clone()).evaluate(drive_state, sensor_data, trigger_threshold);
        TriggerDecision { reason: format!("fallback_{}", decision.reason), ..decision }
    }

    async fn call_model(&self, user_prompt: &str) -> Result<String, EngineError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let payload = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt},
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        let body: serde_json::Value = response.json().await?;
        Ok(body["choices"][0]["message"]["content"].as_str().unwrap_or_default().to_string())
    }

    fn build_prompt(&self, drive_state: &DriveState, sensor_data: &SensorData, working_memory: Option<&serde_json::Value>) -> String {
        let mut parts = Vec::new();
        parts.push("## Drive States".to_string());
        let mut drives = drive_state.drives.clone();
        drives.sort_by(|a, b| b.weighted_pressure().partial_cmp(&a.weighted_pressure()).unwrap_or(std::cmp::Ordering::Equal));
        for drive in &drives {
            let filled = (drive.pressure * 10.0) as usize;
            let bar: String = "#".repeat(filled.min(10)) + &".".repeat(10usize.saturating_sub(filled));
            parts.push(format!("- {}: [{bar}] {:.2} (weight: {})", drive.name, drive.pressure, drive.weight));
        }
        parts.push(format!("- **Combined pressure: {:.2}**", drive_state.total_pressure));
        parts.push(String::new());

        parts.push("## Sensor Readings".to_string());
        if let Some(fs) = sensor_data.get("filesystem").and_then(|v| v.get("changes")).and_then(|v| v.as_array()) {
            if fs.is_empty() {
                parts.push("File changes: none".to_string());
            } else {
                parts.push(format!("File changes ({}):", fs.len()));
                for change in fs.iter().take(10) {
                    parts.push(format!("  - {}", change));
                }
            }
        } else {
            parts.push("File changes: none".to_string());
        }

        if let Some(convo) = sensor_data.get("conversation") {
            if convo.get("active").and_then(|v| v.as_bool()).unwrap_or(false) {
                parts.push("Human conversation ACTIVE".to_string());
            } else if convo.get("in_cooldown").and_then(|v| v.as_bool()).unwrap_or(false) {
                parts.push("Human conversation cooldown".to_string());
            } else {
                parts.push("Human conversation: inactive".to_string());
            }
        }

        if !self.history.is_empty() {
            parts.push(String::new());
            parts.push("## Recent Trigger History (last 5)".to_string());
            for entry in self.history.iter().rev().take(5) {
                parts.push(format!("- {} (pressure: {:.2})", entry.reason, entry.total_pressure));
            }
        }

        if let Some(memory) = working_memory {
            parts.push(String::new());
            parts.push("## Working Memory".to_string());
            let mut text = memory.to_string();
            if text.len() > 500 {
                text.truncate(500);
                text.push_str("\n... (truncated)");
            }
            parts.push(text);
        }

        parts.join("\n")
    }
}

/// Strips Markdown code fences before parsing, per `original_source`'s
/// `_parse_response`.
fn parse_response(content: &str) -> Result<ModelResponse, serde_json::Error> {
    let cleaned = strip_code_fences(content);
    serde_json::from_str(&cleaned)
}

fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let without_lang = rest.split_once('\n').map(|(_, tail)| tail).unwrap_or(rest);
        without_lang.strip_suffix("```").unwrap_or(without_lang).trim().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
