// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Health Surface: a read-only `axum` API bound to `127.0.0.1:<health_port>`,
//! grounded on `coop-mux`'s `transport::http` router/handler pattern and its
//! `axum::serve(..).with_graceful_shutdown(..)` spawn idiom (`coop`'s
//! `run.rs` spawns its own health probe the same way).
//!
//! The Daemon Loop is the sole owner of live drive/evaluator state (spec.md
//! §3's ownership rule), so this module never touches it directly. Every
//! tick the loop publishes a fresh [`StatusSnapshot`] into a shared
//! `RwLock`, which the four `GET` handlers read without blocking the loop.
//! `POST /feedback` is the one endpoint that must mutate live state: it
//! hands its [`pulse_core::FeedbackMessage`] to the loop over an mpsc
//! channel and awaits a oneshot reply, so the actual mutation still happens
//! on the loop's own task during its FEEDBACK INTAKE step.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pulse_config::ConfigOverrides;
use pulse_core::{Clock, DriveState, FeedbackMessage, SystemClock};
use pulse_engine::EvaluatorStatus;
use pulse_storage::MutationLog;
use serde::Serialize;
use serde_json::json;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_util::sync::CancellationToken;

use crate::error::DaemonError;
use crate::feedback::DrivesUpdated;

/// One pending `POST /feedback` request handed off to the Daemon Loop.
pub type FeedbackRequest = (FeedbackMessage, oneshot::Sender<DrivesUpdated>);

/// Everything `/status` and `/evolution` report, republished once per tick.
/// Cheap to clone — read contention never blocks the loop for longer than a
/// clone.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub turn_count: u64,
    pub drive_state: DriveState,
    pub evaluator: EvaluatorStatus,
    pub can_trigger: bool,
    pub trigger_threshold: f64,
    pub pressure_rate: f64,
    pub min_trigger_interval: u64,
    pub max_turns_per_hour: u32,
    pub config_overrides: ConfigOverrides,
}

impl StatusSnapshot {
    /// Placeholder published before the first tick completes.
    pub fn starting(trigger_threshold: f64, pressure_rate: f64, min_trigger_interval: u64, max_turns_per_hour: u32) -> Self {
        Self {
            turn_count: 0,
            drive_state: DriveState::new(Vec::new(), 0),
            evaluator: EvaluatorStatus { mode: "rules".to_string(), consecutive_failures: 0, suppressed_until: 0 },
            can_trigger: false,
            trigger_threshold,
            pressure_rate,
            min_trigger_interval,
            max_turns_per_hour,
            config_overrides: ConfigOverrides::default(),
        }
    }
}

/// Shared handle the health server's handlers close over.
pub struct HealthState {
    pub status: Arc<RwLock<StatusSnapshot>>,
    pub mutations: MutationLog,
    pub feedback_tx: mpsc::Sender<FeedbackRequest>,
    pub started_at: u64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
    turn_count: u64,
    version: &'static str,
}

async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let snapshot = state.status.read().await;
    let uptime_seconds = SystemClock.epoch_secs().saturating_sub(state.started_at);
    Json(HealthResponse { status: "ok", uptime_seconds, turn_count: snapshot.turn_count, version: env!("CARGO_PKG_VERSION") })
}

async fn status_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    Json(state.status.read().await.clone())
}

#[derive(Debug, Serialize)]
struct EvolutionResponse {
    weights: HashMap<String, f64>,
    trigger_threshold: f64,
    pressure_rate: f64,
    min_trigger_interval: u64,
    max_turns_per_hour: u32,
    recent_mutations: Vec<pulse_core::MutationRecord>,
}

async fn evolution_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let snapshot = state.status.read().await.clone();
    let weights = snapshot.drive_state.drives.iter().map(|d| (d.name.clone(), d.weight)).collect();
    let recent_mutations = match state.mutations.recent(20) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read mutation log for /evolution");
            Vec::new()
        }
    };
    Json(EvolutionResponse {
        weights,
        trigger_threshold: snapshot.trigger_threshold,
        pressure_rate: snapshot.pressure_rate,
        min_trigger_interval: snapshot.min_trigger_interval,
        max_turns_per_hour: snapshot.max_turns_per_hour,
        recent_mutations,
    })
}

#[derive(Debug, serde::Deserialize)]
struct MutationsQuery {
    n: Option<usize>,
}

async fn mutations_handler(State(state): State<Arc<HealthState>>, Query(params): Query<MutationsQuery>) -> impl IntoResponse {
    let n = params.n.unwrap_or(50).clamp(1, 1000);
    match state.mutations.recent(n) {
        Ok(records) => Json(records).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read mutation log for /mutations");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

async fn feedback_handler(State(state): State<Arc<HealthState>>, Json(message): Json<FeedbackMessage>) -> impl IntoResponse {
    let (respond_to, reply) = oneshot::channel();
    if state.feedback_tx.send((message, respond_to)).await.is_err() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "error": "daemon loop is not accepting feedback" })),
        )
            .into_response();
    }
    match reply.await {
        Ok(drives_updated) => Json(json!({ "status": "ok", "drives_updated": drives_updated })).into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "error": "daemon loop dropped the feedback request" })),
        )
            .into_response(),
    }
}

/// Build the Health Surface router. No auth, localhost-only by virtue of
/// the bind address the caller chooses — spec.md §4.12 treats this as
/// inherent to local-only deployment, not an application-level concern.
pub fn build_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/evolution", get(evolution_handler))
        .route("/mutations", get(mutations_handler))
        .route("/feedback", post(feedback_handler))
        .with_state(state)
}

/// Bind and serve the Health Surface until `shutdown` is cancelled.
pub async fn serve(addr: SocketAddr, router: Router, shutdown: CancellationToken) -> Result<(), DaemonError> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(DaemonError::Health)?;
    tracing::info!(%addr, "health surface listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(DaemonError::Health)
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
