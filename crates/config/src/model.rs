// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hierarchical Pulse configuration model, one section per `[table]` in
//! the TOML file. Every field carries the default the original daemon used.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PulseConfig {
    pub webhook: WebhookConfig,
    pub workspace: WorkspaceConfig,
    pub drives: DrivesConfig,
    pub sensors: SensorsConfig,
    pub evaluator: EvaluatorConfig,
    pub state: StateConfig,
    pub daemon: DaemonConfig,
    pub generative: GenerativeConfig,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            webhook: WebhookConfig::default(),
            workspace: WorkspaceConfig::default(),
            drives: DrivesConfig::default(),
            sensors: SensorsConfig::default(),
            evaluator: EvaluatorConfig::default(),
            state: StateConfig::default(),
            daemon: DaemonConfig::default(),
            generative: GenerativeConfig::default(),
        }
    }
}

/// `[webhook]` — trigger dispatch parameters. Named for what it governs
/// (the outbound webhook), rather than the hosting integration's own name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub token: String,
    pub message_prefix: String,
    pub max_turns_per_hour: u32,
    pub min_trigger_interval: u64,
    pub session_mode: String,
    pub deliver: bool,
    pub isolated_model: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:18789/hooks/agent".to_string(),
            token: String::new(),
            message_prefix: "[PULSE]".to_string(),
            max_turns_per_hour: 10,
            min_trigger_interval: 300,
            session_mode: "isolated".to_string(),
            deliver: true,
            isolated_model: None,
        }
    }
}

/// `[workspace]` — paths the Drive Engine's source refresh reads, relative
/// to `root` unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub root: String,
    pub goals: String,
    pub emotions: String,
    pub hypotheses: String,
    pub working_memory: String,
    pub evolution: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: "~/.openclaw/workspace".to_string(),
            goals: "scripts/goals.py".to_string(),
            emotions: "memory/self/emotional-landscape.json".to_string(),
            hypotheses: "memory/self/hypotheses.json".to_string(),
            working_memory: "memory/self/working-memory.json".to_string(),
            evolution: "memory/self/evolution.json".to_string(),
        }
    }
}

impl WorkspaceConfig {
    /// Resolve a workspace-relative path (one of the field names above) to
    /// an absolute path under `root`.
    pub fn resolve_path(&self, relative: &str) -> std::path::PathBuf {
        expand_tilde(&self.root).join(relative)
    }
}

/// Expand a leading `~` to `$HOME`, mirroring Python's `Path(...).expanduser()`.
pub fn expand_tilde(path: &str) -> std::path::PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home).join(rest);
        }
    }
    std::path::PathBuf::from(path)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriveCategory {
    pub weight: f64,
    pub source: String,
}

impl Default for DriveCategory {
    fn default() -> Self {
        Self { weight: 1.0, source: String::new() }
    }
}

/// `[drives]` — Drive Engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DrivesConfig {
    pub pressure_rate: f64,
    pub trigger_threshold: f64,
    pub max_pressure: f64,
    pub success_decay: f64,
    pub failure_boost: f64,
    pub override_min_individual_pressure: f64,
    pub adaptive_decay: bool,
    pub categories: BTreeMap<String, DriveCategory>,
}

impl Default for DrivesConfig {
    fn default() -> Self {
        Self {
            pressure_rate: 0.01,
            trigger_threshold: 0.7,
            max_pressure: 5.0,
            success_decay: 0.35,
            failure_boost: 0.2,
            override_min_individual_pressure: 1.5,
            adaptive_decay: true,
            categories: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilesystemSensorConfig {
    pub enabled: bool,
    pub watch_paths: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub ignore_self_writes: bool,
}

impl Default for FilesystemSensorConfig {
    fn default() -> Self {
        Self { enabled: true, watch_paths: Vec::new(), ignore_patterns: Vec::new(), ignore_self_writes: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SystemSensorConfig {
    pub enabled: bool,
    pub memory_threshold_percent: u8,
    pub watch_processes: Vec<String>,
}

impl Default for SystemSensorConfig {
    fn default() -> Self {
        Self { enabled: true, memory_threshold_percent: 85, watch_processes: Vec::new() }
    }
}

/// `[sensors]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorsConfig {
    pub filesystem: FilesystemSensorConfig,
    pub system: SystemSensorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub single_drive_threshold: f64,
    pub combined_threshold: f64,
    pub suppress_during_conversation: bool,
    pub conversation_cooldown_minutes: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            single_drive_threshold: 0.8,
            combined_threshold: 0.7,
            suppress_during_conversation: true,
            conversation_cooldown_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelEvalConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_seconds: u64,
    pub max_suppress_minutes: u32,
}

impl Default for ModelEvalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434/v1".to_string(),
            api_key: "ollama".to_string(),
            model: "llama3.2:3b".to_string(),
            max_tokens: 512,
            temperature: 0.3,
            timeout_seconds: 10,
            max_suppress_minutes: 30,
        }
    }
}

/// `[evaluator]` — gating policy selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub mode: String,
    pub rules: RulesConfig,
    pub model: ModelEvalConfig,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { mode: "rules".to_string(), rules: RulesConfig::default(), model: ModelEvalConfig::default() }
    }
}

/// `[state]` — State Store parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StateConfig {
    pub dir: String,
    pub save_interval: u64,
    pub history_retention_days: u32,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { dir: "~/.pulse/state".to_string(), save_interval: 60, history_retention_days: 30 }
    }
}

/// `[daemon]` — loop behavior and process supervision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    pub loop_interval_seconds: u64,
    pub shutdown_timeout: u64,
    pub pid_file: String,
    pub health_port: u16,
    pub integration: String,
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            loop_interval_seconds: 30,
            shutdown_timeout: 10,
            pid_file: "~/.pulse/pulse.pid".to_string(),
            health_port: 9720,
            integration: "default".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// `[generative]` — GENERATE-hint parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerativeConfig {
    pub enabled: bool,
    pub max_tasks: u32,
    pub min_idle_minutes: u32,
    pub roadmap_files: Vec<String>,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_tasks: 3,
            min_idle_minutes: 15,
            roadmap_files: vec!["TIERS.md".to_string(), "ROADMAP.md".to_string(), "TODO.md".to_string()],
        }
    }
}
