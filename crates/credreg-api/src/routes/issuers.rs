//! # Issuer Lifecycle
//!
//! - `POST /v1/issuers/authorize`: bind an issuer name to an identity (administrator).
//! - `POST /v1/issuers/revoke`: clear an issuer binding (administrator).
//! - `GET /v1/issuers/status?name=`: `{key, authorized, identity}`.
//! - `GET /v1/identities/{identity}`: roles and binding of an identity.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use credreg_core::{Identity, IssuerKey};
use credreg_registry::Role;

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, parse_hex};
use crate::routes::audit::AuditRecordResponse;
use crate::routes::committed;
use crate::state::AppState;

/// Request body for issuer authorization.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthorizeIssuerRequest {
    /// Human-readable issuer name.
    pub name: String,
    /// Identity to bind, 20-byte hex.
    #[schema(value_type = String, example = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8")]
    pub identity: Identity,
}

/// Request body for issuer revocation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RevokeIssuerRequest {
    pub name: String,
}

/// Query parameters for the status lookup.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusQuery {
    /// Issuer name.
    pub name: String,
}

/// Directory status of one issuer name.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssuerStatusResponse {
    pub name: String,
    /// `SHA-256(name)`.
    #[schema(value_type = String)]
    pub key: IssuerKey,
    pub authorized: bool,
    /// Bound identity, or the zero identity.
    #[schema(value_type = String)]
    pub identity: Identity,
}

/// Roles and directory binding of an identity.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdentityResponse {
    #[schema(value_type = String)]
    pub identity: Identity,
    pub is_administrator: bool,
    pub is_issuer: bool,
    /// Issuer key the identity is bound to, or zero.
    #[schema(value_type = String)]
    pub issuer_key: IssuerKey,
}

/// Build the issuer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/issuers/authorize", post(authorize_issuer))
        .route("/v1/issuers/revoke", post(revoke_issuer))
        .route("/v1/issuers/status", get(issuer_status))
        .route("/v1/identities/{identity}", get(identity_roles))
}

/// POST /v1/issuers/authorize
#[utoipa::path(
    post,
    path = "/v1/issuers/authorize",
    request_body = AuthorizeIssuerRequest,
    responses(
        (status = 201, description = "Issuer authorized; IssuerAuthorized record", body = AuditRecordResponse),
        (status = 401, description = "No bearer token", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the administrator", body = crate::error::ErrorBody),
        (status = 409, description = "Issuer or identity already authorized", body = crate::error::ErrorBody),
        (status = 422, description = "Empty name or zero identity", body = crate::error::ErrorBody),
    ),
    tag = "issuers"
)]
pub(crate) async fn authorize_issuer(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<AuthorizeIssuerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuditRecordResponse>), AppError> {
    let caller = caller.require_identity()?;
    let req = extract_json(body)?;
    let result = state.ledger.authorize_issuer(caller, &req.name, req.identity);
    let record = committed(result)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /v1/issuers/revoke
#[utoipa::path(
    post,
    path = "/v1/issuers/revoke",
    request_body = RevokeIssuerRequest,
    responses(
        (status = 200, description = "Issuer revoked; IssuerRevoked record", body = AuditRecordResponse),
        (status = 401, description = "No bearer token", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the administrator", body = crate::error::ErrorBody),
        (status = 404, description = "Issuer not authorized", body = crate::error::ErrorBody),
    ),
    tag = "issuers"
)]
pub(crate) async fn revoke_issuer(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<RevokeIssuerRequest>, JsonRejection>,
) -> Result<Json<AuditRecordResponse>, AppError> {
    let caller = caller.require_identity()?;
    let req = extract_json(body)?;
    let result = state.ledger.revoke_issuer(caller, &req.name);
    Ok(Json(committed(result)?))
}

/// GET /v1/issuers/status
#[utoipa::path(
    get,
    path = "/v1/issuers/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "Directory status", body = IssuerStatusResponse),
    ),
    tag = "issuers"
)]
pub(crate) async fn issuer_status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<IssuerStatusResponse>, AppError> {
    let StatusQuery { name } = extract_query(query)?;
    let status = state.ledger.read(|reg, _| reg.issuer_status(&name));
    Ok(Json(IssuerStatusResponse {
        name,
        key: status.key,
        authorized: status.authorized,
        identity: status.identity,
    }))
}

/// GET /v1/identities/{identity}
#[utoipa::path(
    get,
    path = "/v1/identities/{identity}",
    params(("identity" = String, Path, description = "20-byte hex identity")),
    responses(
        (status = 200, description = "Roles and binding", body = IdentityResponse),
        (status = 422, description = "Malformed identity", body = crate::error::ErrorBody),
    ),
    tag = "issuers"
)]
pub(crate) async fn identity_roles(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<IdentityResponse>, AppError> {
    let identity: Identity = parse_hex(&raw)?;
    let response = state.ledger.read(|reg, _| IdentityResponse {
        identity,
        is_administrator: reg.has_role(identity, Role::Administrator),
        is_issuer: reg.has_role(identity, Role::Issuer),
        issuer_key: reg.issuer_key_by_identity(identity),
    });
    Ok(Json(response))
}
