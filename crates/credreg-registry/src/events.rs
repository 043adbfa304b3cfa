//! Audit events: the second output of every committed mutation.
//!
//! Field sets are fixed; hosting layers expose them unchanged.

use serde::{Deserialize, Serialize};

use credreg_core::{CredentialKey, Identity, IssuerKey, Timestamp};

/// One event per successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    /// An issuer name was bound to an identity.
    IssuerAuthorized {
        /// `SHA-256(name)`.
        key: IssuerKey,
        /// Issuer name.
        name: String,
        /// Bound identity.
        identity: Identity,
    },
    /// An issuer binding was cleared.
    IssuerRevoked {
        /// `SHA-256(name)`.
        key: IssuerKey,
        /// Issuer name.
        name: String,
    },
    /// A credential record was created.
    CredentialIssued {
        /// Credential key.
        credential_key: CredentialKey,
        /// Directory key of the issuer.
        issuer_key: IssuerKey,
        /// Issuance time.
        timestamp: Timestamp,
    },
    /// A credential record was revoked.
    CredentialRevoked {
        /// Credential key.
        credential_key: CredentialKey,
        /// Directory key of the issuer.
        issuer_key: IssuerKey,
    },
}

impl RegistryEvent {
    /// The event name, as it appears in the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::IssuerAuthorized { .. } => "IssuerAuthorized",
            Self::IssuerRevoked { .. } => "IssuerRevoked",
            Self::CredentialIssued { .. } => "CredentialIssued",
            Self::CredentialRevoked { .. } => "CredentialRevoked",
        }
    }

    /// The credential key this event concerns, if any.
    pub fn credential_key(&self) -> Option<CredentialKey> {
        match self {
            Self::CredentialIssued { credential_key, .. }
            | Self::CredentialRevoked { credential_key, .. } => Some(*credential_key),
            _ => None,
        }
    }

    /// The issuer key this event concerns. Every event has one.
    pub fn issuer_key(&self) -> IssuerKey {
        match self {
            Self::IssuerAuthorized { key, .. } | Self::IssuerRevoked { key, .. } => *key,
            Self::CredentialIssued { issuer_key, .. }
            | Self::CredentialRevoked { issuer_key, .. } => *issuer_key,
        }
    }
}
