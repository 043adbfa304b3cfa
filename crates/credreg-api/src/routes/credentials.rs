//! # Credential Issuance and Verification
//!
//! - `POST /v1/credentials/issue`: create a record (bound issuer identity).
//! - `POST /v1/credentials/revoke`: revoke a record (issuing party).
//! - `GET /v1/credentials/{key}`: full record, or the all-zero sentinel.
//! - `GET /v1/credentials/{key}/verify?issuer_name=`: verification tuple.
//!
//! The two `GET` endpoints are open to anonymous callers and never fail for
//! a well-formed key.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use credreg_core::{CategoryTag, CredentialKey, Identity, IssuerKey, Timestamp};
use credreg_registry::{CredentialView, Verification};

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, parse_hex};
use crate::routes::audit::AuditRecordResponse;
use crate::routes::committed;
use crate::state::AppState;

/// Request body for credential issuance.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueCredentialRequest {
    /// 32-byte hex credential key, usually `SHA-256(document)`.
    #[schema(value_type = String)]
    pub credential_key: CredentialKey,
    /// Name of the issuer the caller is bound to.
    pub issuer_name: String,
    /// 32-byte hex category tag, usually `SHA-256("BACHELOR")` etc.
    #[schema(value_type = String)]
    pub category: CategoryTag,
}

/// Request body for credential revocation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RevokeCredentialRequest {
    #[schema(value_type = String)]
    pub credential_key: CredentialKey,
    pub issuer_name: String,
}

/// Stored credential record, or the all-zero sentinel.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CredentialRecordResponse {
    #[schema(value_type = String)]
    pub credential_key: CredentialKey,
    pub exists: bool,
    pub revoked: bool,
    #[schema(value_type = String)]
    pub issuer: Identity,
    #[schema(value_type = u64)]
    pub issued_at: Timestamp,
    #[schema(value_type = String)]
    pub category: CategoryTag,
    #[schema(value_type = String)]
    pub issuer_key: IssuerKey,
}

impl CredentialRecordResponse {
    fn new(credential_key: CredentialKey, view: CredentialView) -> Self {
        Self {
            credential_key,
            exists: view.exists,
            revoked: view.revoked,
            issuer: view.issuer,
            issued_at: view.issued_at,
            category: view.category,
            issuer_key: view.issuer_key,
        }
    }
}

/// Query parameters for verification.
#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyQuery {
    /// Claimed issuer name.
    pub issuer_name: String,
}

/// Verification result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationResponse {
    pub is_valid: bool,
    pub exists: bool,
    #[schema(value_type = String)]
    pub issuer: Identity,
    #[schema(value_type = u64)]
    pub issued_at: Timestamp,
    pub revoked: bool,
    #[schema(value_type = String)]
    pub category: CategoryTag,
}

impl From<Verification> for VerificationResponse {
    fn from(v: Verification) -> Self {
        Self {
            is_valid: v.is_valid,
            exists: v.exists,
            issuer: v.issuer,
            issued_at: v.issued_at,
            revoked: v.revoked,
            category: v.category,
        }
    }
}

/// Build the credentials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/credentials/issue", post(issue_credential))
        .route("/v1/credentials/revoke", post(revoke_credential))
        .route("/v1/credentials/{key}", get(get_credential))
        .route("/v1/credentials/{key}/verify", get(verify_credential))
}

/// POST /v1/credentials/issue
#[utoipa::path(
    post,
    path = "/v1/credentials/issue",
    request_body = IssueCredentialRequest,
    responses(
        (status = 201, description = "Credential issued; CredentialIssued record", body = AuditRecordResponse),
        (status = 401, description = "No bearer token", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the issuer's bound identity", body = crate::error::ErrorBody),
        (status = 409, description = "Credential key already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Zero credential key", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn issue_credential(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<IssueCredentialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuditRecordResponse>), AppError> {
    let caller = caller.require_identity()?;
    let req = extract_json(body)?;
    let result =
        state
            .ledger
            .issue_credential(caller, req.credential_key, &req.issuer_name, req.category);
    let record = committed(result)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /v1/credentials/revoke
#[utoipa::path(
    post,
    path = "/v1/credentials/revoke",
    request_body = RevokeCredentialRequest,
    responses(
        (status = 200, description = "Credential revoked; CredentialRevoked record", body = AuditRecordResponse),
        (status = 401, description = "No bearer token", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the issuing party", body = crate::error::ErrorBody),
        (status = 404, description = "Credential not found", body = crate::error::ErrorBody),
        (status = 409, description = "Credential already revoked", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn revoke_credential(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<RevokeCredentialRequest>, JsonRejection>,
) -> Result<Json<AuditRecordResponse>, AppError> {
    let caller = caller.require_identity()?;
    let req = extract_json(body)?;
    let result = state
        .ledger
        .revoke_credential(caller, req.credential_key, &req.issuer_name);
    Ok(Json(committed(result)?))
}

/// GET /v1/credentials/{key}
#[utoipa::path(
    get,
    path = "/v1/credentials/{key}",
    params(("key" = String, Path, description = "32-byte hex credential key")),
    responses(
        (status = 200, description = "Record or all-zero sentinel", body = CredentialRecordResponse),
        (status = 422, description = "Malformed key", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn get_credential(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<CredentialRecordResponse>, AppError> {
    let key: CredentialKey = parse_hex(&raw)?;
    let view = state.ledger.read(|reg, _| reg.credential_record(&key));
    Ok(Json(CredentialRecordResponse::new(key, view)))
}

/// GET /v1/credentials/{key}/verify
#[utoipa::path(
    get,
    path = "/v1/credentials/{key}/verify",
    params(
        ("key" = String, Path, description = "32-byte hex credential key"),
        VerifyQuery,
    ),
    responses(
        (status = 200, description = "Verification tuple", body = VerificationResponse),
        (status = 400, description = "Missing issuer_name", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed key", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn verify_credential(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> Result<Json<VerificationResponse>, AppError> {
    let key: CredentialKey = parse_hex(&raw)?;
    let VerifyQuery { issuer_name } = extract_query(query)?;
    Ok(Json(state.ledger.verify_credential(&key, &issuer_name).into()))
}
