//! # Registry Errors
//!
//! Every rejected transition is a synchronous, non-retryable
//! [`RegistryError`] that leaves state untouched. [`RegistryError::kind`]
//! collapses the detailed variants onto the failure-kind taxonomy that
//! hosting layers map to their own status codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use credreg_core::{CanonicalizationError, CredentialKey, Identity, IssuerKey};

use crate::access::Role;
use crate::store::StoreError;

/// Failure kinds visible to hosting layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Caller lacks the role the operation requires.
    Unauthorized,
    /// The issuer (or the identity) is already authorized.
    AlreadyAuthorized,
    /// A credential with this key already exists.
    AlreadyExists,
    /// The credential is already revoked.
    AlreadyRevoked,
    /// No active directory entry for the issuer.
    NotAuthorized,
    /// No credential with this key.
    NotFound,
    /// Caller is not the bound identity of an authorized issuer.
    NotAuthorizedIssuer,
    /// Caller is not the party that issued the credential.
    NotIssuingParty,
    /// Malformed input: empty name, zero identity, zero key.
    InvalidArgument,
    /// The audit record could not be sealed.
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::AlreadyAuthorized => "ALREADY_AUTHORIZED",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::AlreadyRevoked => "ALREADY_REVOKED",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::NotAuthorizedIssuer => "NOT_AUTHORIZED_ISSUER",
            Self::NotIssuingParty => "NOT_ISSUING_PARTY",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected registry transition.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Caller does not hold the required role.
    #[error("{caller} does not hold the {role} role")]
    Unauthorized {
        /// The calling identity.
        caller: Identity,
        /// The role the operation requires.
        role: Role,
    },

    /// The issuer name already has an authorized directory entry.
    #[error("issuer \"{name}\" already authorized")]
    AlreadyAuthorized {
        /// Issuer name.
        name: String,
    },

    /// The identity is already bound to another authorized issuer.
    #[error("identity {identity} already bound to issuer {key}")]
    IdentityAlreadyBound {
        /// The identity being bound.
        identity: Identity,
        /// The issuer key it is currently bound to.
        key: IssuerKey,
    },

    /// No authorized directory entry for this issuer name.
    #[error("issuer \"{name}\" is not authorized")]
    NotAuthorized {
        /// Issuer name.
        name: String,
    },

    /// Caller is not the bound identity of an authorized issuer.
    #[error("{caller} is not the authorized identity of issuer \"{name}\"")]
    NotAuthorizedIssuer {
        /// The calling identity.
        caller: Identity,
        /// The issuer name supplied.
        name: String,
    },

    /// A credential with this key already exists.
    #[error("credential {key} already exists")]
    AlreadyExists {
        /// Credential key.
        key: CredentialKey,
    },

    /// No credential with this key.
    #[error("credential {key} not found")]
    NotFound {
        /// Credential key.
        key: CredentialKey,
    },

    /// Caller or issuer name does not match the stored issuing party.
    #[error("{caller} is not the issuing party of credential {key}")]
    NotIssuingParty {
        /// The calling identity.
        caller: Identity,
        /// Credential key.
        key: CredentialKey,
    },

    /// Credential already revoked.
    #[error("credential {key} already revoked")]
    AlreadyRevoked {
        /// Credential key.
        key: CredentialKey,
    },

    /// Issuer name is empty.
    #[error("issuer name must not be empty")]
    EmptyIssuerName,

    /// Identity is the zero sentinel.
    #[error("identity must not be zero")]
    ZeroIdentity,

    /// Credential key is the zero sentinel.
    #[error("credential key must not be zero")]
    InvalidKey,

    /// A loaded registry grants the Issuer role to an identity no authorized
    /// directory entry binds, or binds an identity lacking the role.
    #[error("issuer role of {identity} disagrees with the issuer directory")]
    RoleMismatch {
        /// The identity present on only one side.
        identity: Identity,
    },

    /// A loaded credential names an issuer key the directory has never held.
    #[error("credential {key} names unknown issuer {issuer_key}")]
    UnknownIssuer {
        /// Credential key.
        key: CredentialKey,
        /// The issuer key stored on the credential.
        issuer_key: IssuerKey,
    },

    /// Audit record digest computation failed.
    #[error("audit record could not be sealed: {0}")]
    Seal(#[from] CanonicalizationError),

    /// The snapshot carrying the mutation could not be written; nothing was
    /// applied.
    #[error("mutation not persisted: {0}")]
    Persist(#[from] StoreError),
}

impl RegistryError {
    /// The failure kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::AlreadyAuthorized { .. } | Self::IdentityAlreadyBound { .. } => {
                ErrorKind::AlreadyAuthorized
            }
            Self::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            Self::NotAuthorizedIssuer { .. } => ErrorKind::NotAuthorizedIssuer,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotIssuingParty { .. } => ErrorKind::NotIssuingParty,
            Self::AlreadyRevoked { .. } => ErrorKind::AlreadyRevoked,
            Self::EmptyIssuerName | Self::ZeroIdentity | Self::InvalidKey => {
                ErrorKind::InvalidArgument
            }
            Self::RoleMismatch { .. }
            | Self::UnknownIssuer { .. }
            | Self::Seal(_)
            | Self::Persist(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_are_screaming_snake() {
        assert_eq!(ErrorKind::AlreadyExists.as_str(), "ALREADY_EXISTS");
        assert_eq!(
            serde_json::to_string(&ErrorKind::NotIssuingParty).unwrap(),
            "\"NOT_ISSUING_PARTY\""
        );
    }

    #[test]
    fn invalid_inputs_share_one_kind() {
        for err in [
            RegistryError::EmptyIssuerName,
            RegistryError::ZeroIdentity,
            RegistryError::InvalidKey,
        ] {
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn identity_conflict_reports_already_authorized() {
        let err = RegistryError::IdentityAlreadyBound {
            identity: Identity::from_bytes([1; 20]),
            key: IssuerKey::from_bytes([2; 32]),
        };
        assert_eq!(err.kind(), ErrorKind::AlreadyAuthorized);
        assert!(err.to_string().contains("already bound"));
    }
}
