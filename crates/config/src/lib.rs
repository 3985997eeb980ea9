// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-config: TOML configuration loading, `${NAME}` env interpolation,
//! and load-time validation for the Pulse daemon.

mod error;
mod interpolate;
mod model;
mod validate;

use std::path::{Path, PathBuf};

pub use error::ConfigError;
pub use model::{
    DaemonConfig, DriveCategory, DrivesConfig, EvaluatorConfig, FilesystemSensorConfig, GenerativeConfig,
    ModelEvalConfig, PulseConfig, RulesConfig, SensorsConfig, StateConfig, SystemSensorConfig, WebhookConfig,
    WorkspaceConfig,
};
pub use model::expand_tilde;

/// Load config from an explicit path, or fall back to the default search
/// order (`./pulse.toml`, then `~/.pulse/pulse.toml`), then to built-in
/// defaults if neither exists. Applies `${NAME}` interpolation to
/// `webhook.token` (required) and `webhook.url`/`evaluator.model.base_url`/
/// `evaluator.model.api_key` (optional), then validates.
pub fn load(explicit_path: Option<&Path>) -> Result<PulseConfig, ConfigError> {
    let path = explicit_path.map(PathBuf::from).or_else(default_config_path);

    let mut config = match path {
        Some(path) if path.exists() => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
            toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?
        }
        _ => PulseConfig::default(),
    };

    interpolate_env(&mut config)?;
    validate::validate(&config)?;
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    let cwd_candidate = PathBuf::from("pulse.toml");
    if cwd_candidate.exists() {
        return Some(cwd_candidate);
    }
    let home_candidate = expand_tilde("~/.pulse/pulse.toml");
    if home_candidate.exists() {
        return Some(home_candidate);
    }
    None
}

fn interpolate_env(config: &mut PulseConfig) -> Result<(), ConfigError> {
    config.webhook.token = interpolate::resolve(&config.webhook.token, true)?;
    config.webhook.url = interpolate::resolve(&config.webhook.url, false)?;
    config.evaluator.model.base_url = interpolate::resolve(&config.evaluator.model.base_url, false)?;
    config.evaluator.model.api_key = interpolate::resolve(&config.evaluator.model.api_key, false)?;
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
