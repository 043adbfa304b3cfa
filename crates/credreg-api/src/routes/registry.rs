//! `GET /v1/registry`: administrator, role tags, counts, journal head.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use credreg_core::{ContentDigest, Identity};
use credreg_registry::LedgerSummary;

use crate::state::AppState;

/// Registry overview.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistryInfoResponse {
    #[schema(value_type = String)]
    pub administrator: Identity,
    /// `SHA-256("ADMINISTRATOR_ROLE")`.
    #[schema(value_type = String)]
    pub administrator_role: ContentDigest,
    /// `SHA-256("ISSUER_ROLE")`.
    #[schema(value_type = String)]
    pub issuer_role: ContentDigest,
    pub issuers_authorized: usize,
    pub issuers_known: usize,
    pub credentials_issued: usize,
    pub credentials_revoked: usize,
    pub journal_length: usize,
    #[schema(value_type = String)]
    pub head_digest: ContentDigest,
}

impl From<LedgerSummary> for RegistryInfoResponse {
    fn from(s: LedgerSummary) -> Self {
        Self {
            administrator: s.administrator,
            administrator_role: s.administrator_role,
            issuer_role: s.issuer_role,
            issuers_authorized: s.issuers_authorized,
            issuers_known: s.issuers_known,
            credentials_issued: s.credentials_issued,
            credentials_revoked: s.credentials_revoked,
            journal_length: s.journal_length,
            head_digest: s.head_digest,
        }
    }
}

/// Build the registry info router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/registry", get(registry_info))
}

/// GET /v1/registry
#[utoipa::path(
    get,
    path = "/v1/registry",
    responses((status = 200, description = "Registry overview", body = RegistryInfoResponse)),
    tag = "registry"
)]
pub(crate) async fn registry_info(State(state): State<AppState>) -> Json<RegistryInfoResponse> {
    Json(state.ledger.summary().into())
}
