// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pulse` — the command-line entry point for the autonomous cognition
//! daemon. Foreground-only: there is no fork-to-background and no socket
//! IPC, so `start` simply runs the Daemon Loop on the calling process until
//! it receives a shutdown signal, and `stop`/`status` talk to it over the
//! PID file and the Health Surface respectively.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use pulse_daemon::NoopHook;
use sysinfo::{Pid, Signal, System};
use tracing_subscriber::EnvFilter;

/// `<crate version>+<short git hash>`, e.g. `0.1.0+a1b2c3d` — the git hash
/// comes from `build.rs`, which falls back to `unknown` outside a git
/// checkout.
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser)]
#[command(name = "pulse", version = VERSION, about = "Autonomous cognition daemon")]
struct Cli {
    /// Path to pulse.toml. Defaults to ./pulse.toml, then ~/.pulse/pulse.toml.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the daemon loop in the foreground until it is signaled to stop.
    Start,
    /// Send a graceful shutdown signal to a running daemon.
    Stop,
    /// Query the Health Surface's `/status` endpoint.
    Status,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = pulse_config::load(cli.config.as_deref()).context("loading pulse configuration")?;

    match cli.command {
        Command::Start => {
            init_tracing(&config.daemon.log_level);
            tracing::info!(version = VERSION, "starting pulse daemon");
            pulse_daemon::run(config, Box::new(NoopHook)).await.context("daemon loop exited with an error")
        }
        Command::Stop => {
            init_tracing(&config.daemon.log_level);
            stop(&config)
        }
        Command::Status => status(&config).await,
    }
}

fn stop(config: &pulse_config::PulseConfig) -> Result<()> {
    let pid_file = pulse_config::expand_tilde(&config.daemon.pid_file);
    let contents = std::fs::read_to_string(&pid_file)
        .with_context(|| format!("reading pid file at {}", pid_file.display()))?;
    let pid: usize = contents.trim().parse().context("pid file did not contain a valid process id")?;

    let mut system = System::new_all();
    system.refresh_all();
    let process = system.process(Pid::from(pid)).ok_or_else(|| anyhow!("no process with pid {pid} is running"))?;
    match process.kill_with(Signal::Term) {
        Some(true) => {
            tracing::info!(pid, "sent SIGTERM to pulse daemon");
            println!("sent SIGTERM to pulse daemon (pid {pid})");
            Ok(())
        }
        Some(false) => {
            tracing::warn!(pid, "failed to signal pulse daemon");
            Err(anyhow!("failed to signal pulse daemon (pid {pid})"))
        }
        None => Err(anyhow!("SIGTERM is not supported on this platform")),
    }
}

async fn status(config: &pulse_config::PulseConfig) -> Result<()> {
    let url = format!("http://127.0.0.1:{}/status", config.daemon.health_port);
    let response = reqwest::get(&url).await.with_context(|| format!("connecting to health surface at {url}"))?;
    if !response.status().is_success() {
        return Err(anyhow!("health surface returned {}", response.status()));
    }
    let body: serde_json::Value = response.json().await.context("parsing status response")?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
