//! # API Endpoint Handlers
//!
//! Reads take the session read lock; each mutation takes the write lock for
//! exactly one session transition, so a reader never sees a resolution older
//! than the last completed mutation.

use super::{
    AppState,
    types::{
        AuditEntry, AuditResponse, ErrorResponse, HealthResponse, ImportResponse,
        MutationResponse, PlanResponse, ProgressResponse, ResolutionResponse, ToggleRequest,
        ToggleResponse,
    },
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use convalida_core::{
    ConvalidaError, CourseCode, Curriculum, PlanSide, Rule, audit, group_by_term,
};

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn parse_side(raw: &str) -> Result<PlanSide, Response> {
    raw.parse::<PlanSide>()
        .map_err(|e| error(StatusCode::NOT_FOUND, e))
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// READ HANDLERS
// =============================================================================

/// Current resolution with KPIs.
pub async fn resolution_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    let total = session.store().destination().total_credits();
    Json(ResolutionResponse::new(session.resolution(), total))
}

/// Per-category progress.
pub async fn progress_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(ProgressResponse::from(&session.progress()))
}

/// Term-grouped curriculum with marks.
pub async fn plan_handler(
    State(state): State<AppState>,
    Path(side): Path<String>,
) -> Response {
    let side = match parse_side(&side) {
        Ok(side) => side,
        Err(response) => return response,
    };

    let session = state.session.read().await;
    let groups = group_by_term(session.store().curriculum(side));
    Json(PlanResponse::new(&session, side, &groups)).into_response()
}

/// Export the full editable state.
pub async fn export_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(session.export_snapshot())
}

/// Data-quality findings.
pub async fn audit_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    let issues = audit(session.store()).iter().map(AuditEntry::from).collect();
    Json(AuditResponse { issues })
}

// =============================================================================
// COMPLETION HANDLERS
// =============================================================================

/// Flip one completion mark.
pub async fn toggle_handler(
    State(state): State<AppState>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(e) => return error(StatusCode::BAD_REQUEST, e.body_text()),
    };

    let code = CourseCode::new(request.code.trim());
    let mut session = state.session.write().await;
    let completed = session.toggle(code.clone());
    tracing::info!(code = %code, completed, "toggle");

    let resolution = session.resolution();
    Json(ToggleResponse {
        code,
        completed,
        recognized_count: resolution.recognized_count(),
        earned_credits: resolution.earned_credits,
    })
    .into_response()
}

/// Clear every completion mark.
pub async fn reset_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.write().await;
    session.reset_all();
    tracing::info!("reset");
    Json(MutationResponse::from_session(&session))
}

// =============================================================================
// REPLACEMENT HANDLERS
// =============================================================================

/// Replace the origin or destination curriculum.
pub async fn replace_plan_handler(
    State(state): State<AppState>,
    Path(side): Path<String>,
    payload: Result<Json<Curriculum>, JsonRejection>,
) -> Response {
    let side = match parse_side(&side) {
        Ok(side) => side,
        Err(response) => return response,
    };
    let Json(curriculum) = match payload {
        Ok(curriculum) => curriculum,
        Err(e) => return error(StatusCode::BAD_REQUEST, e.body_text()),
    };

    let mut session = state.session.write().await;
    tracing::info!(
        side = %side,
        id = %curriculum.id,
        courses = curriculum.len(),
        "replace curriculum"
    );
    match side {
        PlanSide::Origin => session.replace_origin(curriculum),
        PlanSide::Destination => session.replace_destination(curriculum),
    }
    Json(MutationResponse::from_session(&session)).into_response()
}

/// Replace the rule set.
pub async fn replace_rules_handler(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Rule>>, JsonRejection>,
) -> Response {
    let Json(rules) = match payload {
        Ok(rules) => rules,
        Err(e) => return error(StatusCode::BAD_REQUEST, e.body_text()),
    };

    let mut session = state.session.write().await;
    tracing::info!(rules = rules.len(), "replace rules");
    session.replace_rules(rules);
    Json(MutationResponse::from_session(&session)).into_response()
}

// =============================================================================
// IMPORT HANDLER
// =============================================================================

/// Import a snapshot; fields absent from the payload keep their value.
///
/// Any parse failure yields 400 with the generic message and leaves the
/// session untouched.
pub async fn import_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let mut session = state.session.write().await;

    match session.import_snapshot(&body) {
        Ok(()) => {
            tracing::info!(bytes = body.len(), "import");
            for issue in audit(session.store()) {
                tracing::warn!("Data issue: {}", issue);
            }
            Json(ImportResponse::from_session(&session)).into_response()
        }
        Err(e @ ConvalidaError::SnapshotTooLarge { .. }) => {
            tracing::warn!("Import rejected: {}", e);
            error(StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
        }
        Err(e) => {
            tracing::warn!("Import rejected: {}", e);
            error(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}
