//! # Audit Journal Queries
//!
//! - `GET /v1/audit/events?after=&limit=&credential=&issuer=`: records in
//!   commit order, optionally filtered by credential key or issuer name.
//! - `GET /v1/audit/integrity`: chain verification report.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use credreg_core::{issuer_key, ContentDigest, CredentialKey, Identity, Timestamp};
use credreg_registry::{AuditRecord, ChainIntegrity, RegistryEvent};

use crate::error::AppError;
use crate::extractors::{extract_validated_query, parse_hex, Validate};
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

/// One audit record as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditRecordResponse {
    /// 1-based position in the journal.
    pub sequence: u64,
    pub id: Uuid,
    /// Commit time, seconds since the Unix epoch.
    #[schema(value_type = u64)]
    pub recorded_at: Timestamp,
    #[schema(value_type = String)]
    pub caller: Identity,
    /// The emitted event, tagged by `type`.
    #[schema(value_type = Object)]
    pub event: RegistryEvent,
    #[schema(value_type = String)]
    pub previous_digest: ContentDigest,
    #[schema(value_type = String)]
    pub digest: ContentDigest,
}

impl From<&AuditRecord> for AuditRecordResponse {
    fn from(record: &AuditRecord) -> Self {
        Self {
            sequence: record.sequence,
            id: record.id,
            recorded_at: record.recorded_at,
            caller: record.caller,
            event: record.event.clone(),
            previous_digest: record.previous_digest,
            digest: record.digest,
        }
    }
}

/// Query parameters for the event listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct EventsQuery {
    /// Return records with sequence greater than this (default 0).
    #[serde(default)]
    pub after: u64,
    /// Page size, 1 to 1000 (default 100).
    pub limit: Option<usize>,
    /// Only records concerning this credential key.
    pub credential: Option<String>,
    /// Only records concerning this issuer name.
    pub issuer: Option<String>,
}

impl Validate for EventsQuery {
    fn validate(&self) -> Result<(), String> {
        match self.limit {
            Some(0) => Err("limit must be at least 1".into()),
            Some(n) if n > MAX_LIMIT => Err(format!("limit must be at most {MAX_LIMIT}")),
            _ => Ok(()),
        }
    }
}

/// A page of audit records.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventsResponse {
    pub records: Vec<AuditRecordResponse>,
    /// Sequence to pass as `after` for the next page, if more records exist.
    pub next_after: Option<u64>,
    /// Total records in the journal.
    pub total: usize,
}

/// Chain verification report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntegrityResponse {
    pub total_records: usize,
    pub broken_links: usize,
    pub chain_valid: bool,
    #[schema(value_type = String)]
    pub head: ContentDigest,
}

impl From<ChainIntegrity> for IntegrityResponse {
    fn from(report: ChainIntegrity) -> Self {
        Self {
            total_records: report.total_records,
            broken_links: report.broken_links,
            chain_valid: report.chain_valid,
            head: report.head,
        }
    }
}

/// Build the audit router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/audit/events", get(list_events))
        .route("/v1/audit/integrity", get(integrity))
}

/// GET /v1/audit/events
#[utoipa::path(
    get,
    path = "/v1/audit/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Audit records in commit order", body = EventsResponse),
        (status = 400, description = "Malformed query", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid limit or credential key", body = crate::error::ErrorBody),
    ),
    tag = "audit"
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> Result<Json<EventsResponse>, AppError> {
    let query = extract_validated_query(query)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let credential = query
        .credential
        .as_deref()
        .map(parse_hex::<CredentialKey>)
        .transpose()?;
    let issuer = query.issuer.as_deref().map(issuer_key);

    let response = state.ledger.read(|_, journal| {
        let page = journal.page(query.after, limit, |r| {
            credential.map_or(true, |k| r.event.credential_key() == Some(k))
                && issuer.map_or(true, |k| r.event.issuer_key() == k)
        });
        EventsResponse {
            records: page.records.into_iter().map(AuditRecordResponse::from).collect(),
            next_after: page.next_after,
            total: journal.len(),
        }
    });

    Ok(Json(response))
}

/// GET /v1/audit/integrity
#[utoipa::path(
    get,
    path = "/v1/audit/integrity",
    responses(
        (status = 200, description = "Chain verification report", body = IntegrityResponse),
    ),
    tag = "audit"
)]
pub(crate) async fn integrity(State(state): State<AppState>) -> Json<IntegrityResponse> {
    let report = state.ledger.read(|_, journal| journal.verify_chain());
    Json(report.into())
}
