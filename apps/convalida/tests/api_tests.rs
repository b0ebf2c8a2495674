//! Integration tests for the Convalida HTTP API.
//!
//! Uses axum-test to exercise the router without binding a socket.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use axum_test::TestServer;
use bytes::Bytes;
use convalida::api::{
    AppState, AuditResponse, ErrorResponse, HealthResponse, ImportResponse, MutationResponse,
    PlanResponse, ProgressResponse, ResolutionResponse, ToggleRequest, ToggleResponse,
    create_router,
};
use convalida_core::{PlanSide, Session, primitives::MAX_SNAPSHOT_SIZE};
use serde_json::json;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Test server over the built-in ICOC sample.
fn create_sample_server() -> TestServer {
    let state = AppState::new(Session::sample().unwrap());
    TestServer::new(create_router(state)).unwrap()
}

async fn toggle(server: &TestServer, code: &str) -> ToggleResponse {
    let request = ToggleRequest {
        code: code.to_string(),
    };
    let response = server.post("/completions/toggle").json(&request).await;
    response.assert_status_ok();
    response.json::<ToggleResponse>()
}

async fn resolution(server: &TestServer) -> ResolutionResponse {
    let response = server.get("/resolution").await;
    response.assert_status_ok();
    response.json::<ResolutionResponse>()
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_sample_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// RESOLUTION / PROGRESS
// =============================================================================

#[tokio::test]
async fn test_resolution_with_nothing_completed() {
    let server = create_sample_server();

    let body = resolution(&server).await;

    assert!(body.satisfied.is_empty());
    assert!(body.partials.is_empty());
    assert_eq!(body.earned_credits, 0);
    assert_eq!(body.total_credits, 304);
    assert_eq!(body.recognized_count, 0);
    assert_eq!(body.pending_count, 49);
}

#[tokio::test]
async fn test_toggle_recognizes_destination_courses() {
    let server = create_sample_server();

    let toggled = toggle(&server, "CAL-103").await;
    assert!(toggled.completed);
    assert_eq!(toggled.code.as_str(), "CAL-103");
    assert_eq!(toggled.earned_credits, 12);

    let body = resolution(&server).await;
    let satisfied: Vec<_> = body.satisfied.iter().map(|c| c.as_str()).collect();
    assert_eq!(satisfied, vec!["CVI-200", "CVV-300"]);
    assert_eq!(body.partials.len(), 1);
    assert_eq!(body.partials[0].rule_id, "R7b");
    assert_eq!(body.partials[0].coverage, 100);
    assert_eq!(body.pending_count, 47);
}

#[tokio::test]
async fn test_toggle_twice_restores_state() {
    let server = create_sample_server();

    assert!(toggle(&server, "CAL-103").await.completed);
    let second = toggle(&server, "CAL-103").await;

    assert!(!second.completed);
    assert_eq!(second.earned_credits, 0);
    assert_eq!(resolution(&server).await.recognized_count, 0);
}

#[tokio::test]
async fn test_toggle_accepts_unknown_code() {
    let server = create_sample_server();

    let toggled = toggle(&server, "NOT-A-COURSE").await;

    assert!(toggled.completed);
    assert_eq!(toggled.recognized_count, 0);
}

#[tokio::test]
async fn test_toggle_malformed_body() {
    let server = create_sample_server();

    let response = server
        .post("/completions/toggle")
        .json(&json!({ "codigo": "CAL-103" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_reset_clears_completions() {
    let server = create_sample_server();
    toggle(&server, "CAL-103").await;
    toggle(&server, "DIBUJO-CAD").await;

    let response = server.post("/completions/reset").await;

    response.assert_status_ok();
    let body: MutationResponse = response.json();
    assert!(body.success);
    assert_eq!(body.completed, 0);
    assert_eq!(body.earned_credits, 0);
}

#[tokio::test]
async fn test_progress_by_category() {
    let server = create_sample_server();
    toggle(&server, "CAL-103").await;

    let response = server.get("/progress").await;

    response.assert_status_ok();
    let body: ProgressResponse = response.json();
    assert_eq!(body.categories.len(), 10);
    assert_eq!(body.categories[0].category, "FI/CB");

    let fb = body
        .categories
        .iter()
        .find(|c| c.category == "FB")
        .unwrap();
    assert_eq!(fb.earned, 12);
    assert_eq!(fb.total, 48);
    assert_eq!(fb.percent, 25);
    assert_eq!(body.earned, 12);
    assert_eq!(body.total, 304);
    assert_eq!(body.percent, 4);
}

// =============================================================================
// PLANS
// =============================================================================

#[tokio::test]
async fn test_destination_plan_grouped_by_term() {
    let server = create_sample_server();
    toggle(&server, "OBR-VIA").await;

    let response = server.get("/plans/destination").await;

    response.assert_status_ok();
    let plan: PlanResponse = response.json();
    assert_eq!(plan.side, PlanSide::Destination);
    assert_eq!(plan.id, "icoc-2026");
    assert_eq!(plan.terms.len(), 11);
    assert_eq!(plan.terms[0].term, 0);
    assert_eq!(plan.terms[0].label, "Unscheduled");
    assert_eq!(plan.terms[0].courses[0].course.code.as_str(), "PPROF-2");

    let impacto = plan
        .terms
        .iter()
        .flat_map(|t| t.courses.iter())
        .find(|c| c.course.code.as_str() == "IMPACTO-AMB")
        .unwrap();
    assert!(!impacto.marked);
    assert_eq!(impacto.coverage, Some(60));
}

#[tokio::test]
async fn test_origin_plan_marks_completions() {
    let server = create_sample_server();
    toggle(&server, "CAL-103").await;

    let response = server.get("/plans/origen").await;

    response.assert_status_ok();
    let plan: PlanResponse = response.json();
    assert_eq!(plan.side, PlanSide::Origin);
    let marked: Vec<_> = plan
        .terms
        .iter()
        .flat_map(|t| t.courses.iter())
        .filter(|c| c.marked)
        .map(|c| c.course.code.as_str().to_string())
        .collect();
    assert_eq!(marked, vec!["CAL-103"]);
}

#[tokio::test]
async fn test_unknown_plan_side_is_not_found() {
    let server = create_sample_server();

    let response = server.get("/plans/sideways").await;

    response.assert_status_not_found();
    let body: ErrorResponse = response.json();
    assert!(body.error.contains("sideways"));
}

#[tokio::test]
async fn test_replace_destination_plan() {
    let server = create_sample_server();
    toggle(&server, "CAL-103").await;

    let response = server
        .put("/plans/destination")
        .json(&json!({
            "id": "mini",
            "nombre": "Mini",
            "malla": [
                { "cod": "CVV-300", "nombre": "Calculo", "bloque": "FB", "sct": 9, "nivel": 1 }
            ]
        }))
        .await;

    response.assert_status_ok();
    let body = resolution(&server).await;
    assert_eq!(body.total_credits, 9);
    // CVI-200 is still recognized by R7b but earns nothing.
    assert_eq!(body.earned_credits, 9);
    assert_eq!(body.recognized_count, 2);
    assert_eq!(body.pending_count, 0);
}

#[tokio::test]
async fn test_replace_plan_rejects_malformed_body() {
    let server = create_sample_server();

    let response = server
        .put("/plans/origin")
        .json(&json!({ "id": "x", "malla": [{ "cod": "A" }] }))
        .await;

    response.assert_status_bad_request();
    let plan: PlanResponse = server.get("/plans/origin").await.json();
    assert_eq!(plan.id, "icoc-2016");
}

#[tokio::test]
async fn test_replace_rules() {
    let server = create_sample_server();
    toggle(&server, "CAL-103").await;

    let response = server
        .put("/rules")
        .json(&json!([
            { "id": "X1", "tipo": "1:N", "origen": ["CAL-103"], "destino": ["PPROF-2", "CVV-300"] }
        ]))
        .await;

    response.assert_status_ok();
    let body: MutationResponse = response.json();
    assert_eq!(body.recognized_count, 2);
    assert_eq!(body.earned_credits, 14);
}

// =============================================================================
// SNAPSHOT IMPORT / EXPORT
// =============================================================================

#[tokio::test]
async fn test_export_snapshot_shape() {
    let server = create_sample_server();
    toggle(&server, "DIBUJO-CAD").await;
    toggle(&server, "CAL-103").await;

    let response = server.get("/snapshot").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["planOrigen"]["id"], "icoc-2016");
    assert_eq!(body["planDestino"]["malla"].as_array().unwrap().len(), 49);
    assert_eq!(body["reglas"].as_array().unwrap().len(), 30);
    assert_eq!(body["aprobados"], json!(["CAL-103", "DIBUJO-CAD"]));
}

#[tokio::test]
async fn test_export_then_import_round_trips() {
    let server = create_sample_server();
    toggle(&server, "CAL-103").await;
    let exported = server.get("/snapshot").await.into_bytes();

    server.post("/completions/reset").await.assert_status_ok();
    let response = server.post("/snapshot").bytes(exported).await;

    response.assert_status_ok();
    let body: ImportResponse = response.json();
    assert_eq!(body.completed, 1);
    assert!(resolution(&server).await.satisfied.iter().any(|c| c.as_str() == "CVV-300"));
}

#[tokio::test]
async fn test_partial_import_replaces_only_present_fields() {
    let server = create_sample_server();

    let response = server
        .post("/snapshot")
        .bytes(Bytes::from_static(br#"{"aprobados":["CAL-103","HIDR-400"]}"#))
        .await;

    response.assert_status_ok();
    let body: ImportResponse = response.json();
    assert!(body.success);
    assert_eq!(body.origin_courses, 47);
    assert_eq!(body.destination_courses, 49);
    assert_eq!(body.rules, 30);
    assert_eq!(body.completed, 2);
}

#[tokio::test]
async fn test_malformed_import_leaves_state_unchanged() {
    let server = create_sample_server();
    toggle(&server, "CAL-103").await;

    let payloads: [&[u8]; 5] = [
        b"{not json",
        b"[1, 2, 3]",
        br#"{"aprobados": 7}"#,
        b"[]",
        br#"[null, null, [], ["DIBUJO-CAD"]]"#,
    ];
    for payload in payloads {
        let response = server
            .post("/snapshot")
            .bytes(Bytes::copy_from_slice(payload))
            .await;

        response.assert_status_bad_request();
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Invalid snapshot format");
    }

    let body = resolution(&server).await;
    assert_eq!(body.earned_credits, 12);

    let exported: serde_json::Value = server.get("/snapshot").await.json();
    assert_eq!(exported["reglas"].as_array().unwrap().len(), 30);
    assert_eq!(exported["aprobados"], json!(["CAL-103"]));
}

#[tokio::test]
async fn test_oversized_import_is_rejected() {
    let server = create_sample_server();

    let response = server
        .post("/snapshot")
        .bytes(Bytes::from(vec![b' '; MAX_SNAPSHOT_SIZE + 1]))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

// =============================================================================
// AUDIT
// =============================================================================

#[tokio::test]
async fn test_audit_reports_sample_electives() {
    let server = create_sample_server();

    let response = server.get("/audit").await;

    response.assert_status_ok();
    let body: AuditResponse = response.json();
    let kinds: Vec<_> = body.issues.iter().map(|i| i.kind.as_str()).collect();
    assert_eq!(kinds, vec!["elective_not_applied", "elective_not_applied"]);
    assert!(body.issues[0].message.contains("R24"));
}

#[tokio::test]
async fn test_audit_after_rule_replacement() {
    let server = create_sample_server();
    server
        .put("/rules")
        .json(&json!([
            { "id": "Q", "tipo": "2:2", "origen": ["GHOST"], "destino": ["CVV-300"] }
        ]))
        .await
        .assert_status_ok();

    let body: AuditResponse = server.get("/audit").await.json();
    let kinds: Vec<_> = body.issues.iter().map(|i| i.kind.as_str()).collect();
    assert_eq!(kinds, vec!["unrecognized_kind", "unknown_source"]);
}
