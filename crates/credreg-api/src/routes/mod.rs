//! # Route Modules
//!
//! | Prefix              | Module          |
//! |---------------------|-----------------|
//! | `/v1/issuers/*`     | [`issuers`]     |
//! | `/v1/identities/*`  | [`issuers`]     |
//! | `/v1/credentials/*` | [`credentials`] |
//! | `/v1/audit/*`       | [`audit`]       |
//! | `/v1/registry`      | [`registry`]    |

pub mod audit;
pub mod credentials;
pub mod issuers;
pub mod registry;

use credreg_registry::{AuditRecord, RegistryError};

use crate::error::AppError;
use audit::AuditRecordResponse;

/// Turn a ledger mutation result into its response. Snapshot persistence is
/// part of the ledger commit, so an error here means nothing was applied.
pub(crate) fn committed(
    result: Result<AuditRecord, RegistryError>,
) -> Result<AuditRecordResponse, AppError> {
    Ok(AuditRecordResponse::from(&result?))
}
