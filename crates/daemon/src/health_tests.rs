use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pulse_core::{Drive, DriveState, FeedbackOutcome};
use tempfile::tempdir;
use tower::ServiceExt;

use super::*;

fn sample_snapshot() -> StatusSnapshot {
    let drives = vec![Drive::new("curiosity", "cognitive", 1.0), Drive::new("goals", "cognitive", 1.2)];
    StatusSnapshot {
        turn_count: 4,
        drive_state: DriveState::new(drives, 1_000),
        evaluator: EvaluatorStatus { mode: "rules".to_string(), consecutive_failures: 0, suppressed_until: 0 },
        can_trigger: true,
        trigger_threshold: 5.0,
        pressure_rate: 0.1,
        min_trigger_interval: 300,
        max_turns_per_hour: 12,
        config_overrides: ConfigOverrides::default(),
    }
}

fn build_test_state() -> (Arc<HealthState>, mpsc::Receiver<FeedbackRequest>) {
    let dir = tempdir().unwrap();
    let mutations = MutationLog::new(dir.path().join("mutations.jsonl"));
    let (feedback_tx, feedback_rx) = mpsc::channel(8);
    let state = Arc::new(HealthState {
        status: Arc::new(RwLock::new(sample_snapshot())),
        mutations,
        feedback_tx,
        started_at: 900,
    });
    (state, feedback_rx)
}

#[tokio::test]
async fn health_endpoint_reports_turn_count() {
    let (state, _rx) = build_test_state();
    let router = build_router(state);
    let response = router.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["turn_count"], 4);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn status_endpoint_echoes_shared_snapshot() {
    let (state, _rx) = build_test_state();
    let router = build_router(state);
    let response = router.oneshot(Request::get("/status").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["can_trigger"], true);
    assert_eq!(json["trigger_threshold"], 5.0);
}

#[tokio::test]
async fn evolution_endpoint_reports_weights_and_empty_mutations() {
    let (state, _rx) = build_test_state();
    let router = build_router(state);
    let response = router.oneshot(Request::get("/evolution").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["weights"]["goals"], 1.2);
    assert!(json["recent_mutations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn mutations_endpoint_clamps_n_query_param() {
    let (state, _rx) = build_test_state();
    for i in 0..5 {
        let record = pulse_core::MutationRecord::new(
            i,
            "weight",
            "goals",
            serde_json::json!(1.0),
            serde_json::json!(1.1),
            "test",
        );
        state.mutations.append(&record).unwrap();
    }
    let router = build_router(Arc::clone(&state));
    let response = router.oneshot(Request::get("/mutations?n=2").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn mutations_endpoint_defaults_to_fifty_when_n_absent() {
    let (state, _rx) = build_test_state();
    let router = build_router(state);
    let response = router.oneshot(Request::get("/mutations").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn feedback_endpoint_forwards_request_and_returns_reply() {
    let (state, mut rx) = build_test_state();
    let router = build_router(state);

    let responder = tokio::spawn(async move {
        let (message, reply) = rx.recv().await.unwrap();
        assert_eq!(message.drives_addressed, vec!["goals".to_string()]);
        assert_eq!(message.outcome, FeedbackOutcome::Success);
        let mut drives_updated = crate::feedback::DrivesUpdated::new();
        drives_updated.insert(
            "goals".to_string(),
            pulse_core::DriveDecayResult { before: 1.0, after: 0.3, decayed: 0.7 },
        );
        reply.send(drives_updated).unwrap();
    });

    let payload = serde_json::json!({
        "drives_addressed": ["goals"],
        "outcome": "success",
    });
    let request = Request::post("/feedback")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["drives_updated"]["goals"]["after"], 0.3);
    responder.await.unwrap();
}

#[tokio::test]
async fn feedback_endpoint_returns_service_unavailable_when_loop_is_gone() {
    let (state, rx) = build_test_state();
    drop(rx);
    let router = build_router(state);
    let payload = serde_json::json!({ "drives_addressed": ["goals"], "outcome": "blocked" });
    let request = Request::post("/feedback")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
