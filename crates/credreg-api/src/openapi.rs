//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Credential Registry API",
        version = "0.1.0",
        description = "Issuer allowlist, write-once credential records, open verification, and a hash-chained audit journal.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Issuers
        crate::routes::issuers::authorize_issuer,
        crate::routes::issuers::revoke_issuer,
        crate::routes::issuers::issuer_status,
        crate::routes::issuers::identity_roles,
        // Credentials
        crate::routes::credentials::issue_credential,
        crate::routes::credentials::revoke_credential,
        crate::routes::credentials::get_credential,
        crate::routes::credentials::verify_credential,
        // Audit
        crate::routes::audit::list_events,
        crate::routes::audit::integrity,
        // Registry
        crate::routes::registry::registry_info,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::issuers::AuthorizeIssuerRequest,
        crate::routes::issuers::RevokeIssuerRequest,
        crate::routes::issuers::IssuerStatusResponse,
        crate::routes::issuers::IdentityResponse,
        crate::routes::credentials::IssueCredentialRequest,
        crate::routes::credentials::RevokeCredentialRequest,
        crate::routes::credentials::CredentialRecordResponse,
        crate::routes::credentials::VerificationResponse,
        crate::routes::audit::AuditRecordResponse,
        crate::routes::audit::EventsResponse,
        crate::routes::audit::IntegrityResponse,
        crate::routes::registry::RegistryInfoResponse,
    )),
    tags(
        (name = "issuers", description = "Issuer allowlist management"),
        (name = "credentials", description = "Credential issuance, revocation and verification"),
        (name = "audit", description = "Hash-chained audit journal"),
        (name = "registry", description = "Registry overview"),
    )
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
