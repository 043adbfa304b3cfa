//! # credreg-api: HTTP Service for the Credential Registry
//!
//! Hosts one [`Ledger`](credreg_registry::Ledger) behind an Axum router.
//! Mutations require a bearer token; reads and verification are open.
//!
//! ## API Surface
//!
//! | Prefix              | Module                    | Access             |
//! |---------------------|---------------------------|--------------------|
//! | `/v1/issuers/*`     | [`routes::issuers`]       | administrator / open reads |
//! | `/v1/identities/*`  | [`routes::issuers`]       | open               |
//! | `/v1/credentials/*` | [`routes::credentials`]   | issuers / open reads |
//! | `/v1/audit/*`       | [`routes::audit`]         | open               |
//! | `/v1/registry`      | [`routes::registry`]      | open               |
//! | `/health/*`, `/metrics`, `/openapi.json` | this module, [`openapi`] | open |
//!
//! ## Failure Mapping
//!
//! ```text
//! UNAUTHORIZED, NOT_AUTHORIZED_ISSUER, NOT_ISSUING_PARTY  → 403
//! ALREADY_AUTHORIZED, ALREADY_EXISTS, ALREADY_REVOKED     → 409
//! NOT_AUTHORIZED, NOT_FOUND                               → 404
//! INVALID_ARGUMENT                                        → 422
//! missing/invalid bearer token on a mutation              → 401
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::issuers::router())
        .merge(routes::credentials::router())
        .merge(routes::audit::router())
        .merge(routes::registry::router())
        .merge(openapi::router());

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .route("/metrics", axum::routing::get(prometheus_metrics));

    Router::new()
        .merge(health)
        .merge(api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check: the ledger is in memory, so ready once the journal
/// verifies.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let chain_valid = state.ledger.read(|_, journal| journal.verify_chain().chain_valid);
    if chain_valid {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "audit chain broken")
    }
}

/// GET /metrics: Prometheus text exposition.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "metrics exporter not installed".to_string(),
        ),
    }
}
