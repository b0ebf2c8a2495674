//! # Convalida HTTP API Module
//!
//! JSON API for a web front-end, backed by one in-memory [`Session`].
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /resolution` - Satisfied, partial and pending destination courses
//! - `GET /progress` - Per-category progress
//! - `GET /plans/{side}` - Term-grouped curriculum (`origin` | `destination`)
//! - `PUT /plans/{side}` - Replace a curriculum
//! - `PUT /rules` - Replace the rule set
//! - `POST /completions/toggle` - Flip a completion mark
//! - `POST /completions/reset` - Clear every completion mark
//! - `GET /snapshot` - Export the editable state
//! - `POST /snapshot` - Import a (partial) snapshot
//! - `GET /audit` - Data-quality findings
//!
//! ## Environment Variables
//!
//! - `CONVALIDA_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod types;

pub use handlers::{
    audit_handler, export_handler, health_handler, import_handler, plan_handler,
    progress_handler, replace_plan_handler, replace_rules_handler, reset_handler,
    resolution_handler, toggle_handler,
};
pub use types::{
    AuditEntry, AuditResponse, CategoryJson, ErrorResponse, HealthResponse, ImportResponse,
    MutationResponse, PlanCourse, PlanResponse, ProgressResponse, ResolutionResponse, TermJson,
    ToggleRequest, ToggleResponse,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use convalida_core::{ConvalidaError, Session, primitives::MAX_SNAPSHOT_SIZE};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the session.
#[derive(Clone)]
pub struct AppState {
    /// Curricula, rules and completion marks.
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    /// Create new app state with a session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `CONVALIDA_CORS_ORIGINS`.
///
/// - `*`: any origin
/// - unset: localhost only
/// - otherwise: comma-separated list of origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("CONVALIDA_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (CONVALIDA_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in CONVALIDA_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                cors_with_origins(allowed_origins)
            }
        }
        None => {
            tracing::debug!("CORS: No CONVALIDA_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    cors_with_origins(origins)
}

fn cors_with_origins(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Bodies are capped at the snapshot size limit; larger requests get 413.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/resolution", get(handlers::resolution_handler))
        .route("/progress", get(handlers::progress_handler))
        .route(
            "/plans/{side}",
            get(handlers::plan_handler).put(handlers::replace_plan_handler),
        )
        .route("/rules", put(handlers::replace_rules_handler))
        .route("/completions/toggle", post(handlers::toggle_handler))
        .route("/completions/reset", post(handlers::reset_handler))
        .route(
            "/snapshot",
            get(handlers::export_handler).post(handlers::import_handler),
        )
        .route("/audit", get(handlers::audit_handler))
        .layer(DefaultBodyLimit::max(MAX_SNAPSHOT_SIZE))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, session: Session) -> Result<(), ConvalidaError> {
    let state = AppState::new(session);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ConvalidaError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Convalida HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ConvalidaError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
