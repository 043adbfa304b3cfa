//! # Access Control
//!
//! Two independent identity relations: exactly one Administrator, fixed at
//! construction and never revoked, and a set of Issuers that grows and
//! shrinks with the issuer directory. The roles are not a hierarchy; the
//! administrator holds no issuer powers unless separately authorized.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use credreg_core::{sha256_bytes, ContentDigest, Identity};

use crate::error::RegistryError;

/// A role an identity may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages the issuer allowlist.
    Administrator,
    /// Creates and revokes credential records.
    Issuer,
}

impl Role {
    /// Both roles, in declaration order.
    pub const ALL: [Role; 2] = [Role::Administrator, Role::Issuer];

    /// The role constant name that [`Role::tag`] hashes.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Administrator => "ADMINISTRATOR_ROLE",
            Self::Issuer => "ISSUER_ROLE",
        }
    }

    /// `SHA-256(label)`, the published 32-byte identifier of the role.
    pub fn tag(&self) -> ContentDigest {
        ContentDigest::from_bytes(sha256_bytes(self.label().as_bytes()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Administrator => f.write_str("administrator"),
            Self::Issuer => f.write_str("issuer"),
        }
    }
}

/// Role memberships over caller identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    administrator: Identity,
    issuers: BTreeSet<Identity>,
}

impl AccessControl {
    /// Bind `administrator` to the Administrator role.
    pub fn new(administrator: Identity) -> Self {
        Self {
            administrator,
            issuers: BTreeSet::new(),
        }
    }

    /// The administrator identity.
    pub fn administrator(&self) -> Identity {
        self.administrator
    }

    /// Whether `identity` holds `role`. Never fails.
    pub fn has_role(&self, identity: Identity, role: Role) -> bool {
        match role {
            Role::Administrator => identity == self.administrator,
            Role::Issuer => self.issuers.contains(&identity),
        }
    }

    /// Reject with [`RegistryError::Unauthorized`] unless `identity` holds `role`.
    pub fn require_role(&self, identity: Identity, role: Role) -> Result<(), RegistryError> {
        if self.has_role(identity, role) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized {
                caller: identity,
                role,
            })
        }
    }

    /// Number of identities holding the Issuer role.
    pub fn issuer_count(&self) -> usize {
        self.issuers.len()
    }

    pub(crate) fn issuers(&self) -> &BTreeSet<Identity> {
        &self.issuers
    }

    pub(crate) fn grant_issuer_role(&mut self, identity: Identity) {
        self.issuers.insert(identity);
    }

    pub(crate) fn revoke_issuer_role(&mut self, identity: Identity) {
        self.issuers.remove(&identity);
    }
}
