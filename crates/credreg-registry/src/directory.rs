//! # Issuer Directory
//!
//! `IssuerKey → IssuerEntry`, plus a reverse `Identity → IssuerKey` index
//! over the authorized entries. A key is bound to at most one identity and
//! an identity to at most one key. Revocation clears the binding but keeps
//! the entry, so a later authorization may re-create it under the same or a
//! different identity.
//!
//! The reverse index is never serialized; deserialization rebuilds it from
//! the entries and rejects a directory in which two authorized entries share
//! an identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use credreg_core::{Identity, IssuerKey, Timestamp};

use crate::error::RegistryError;

/// Binding state of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IssuerState {
    /// Bound to `identity` since `since`.
    Authorized {
        /// The bound identity.
        identity: Identity,
        /// When the binding was created.
        since: Timestamp,
    },
    /// Binding cleared at `at`. `previous` is kept for operators only and is
    /// never consulted by authorization checks.
    Revoked {
        /// The identity that was bound.
        previous: Identity,
        /// When the binding was cleared.
        at: Timestamp,
    },
}

/// One issuer directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerEntry {
    /// Human-readable issuer name whose hash is the entry key.
    pub name: String,
    /// Current binding.
    #[serde(flatten)]
    pub state: IssuerState,
}

impl IssuerEntry {
    /// The bound identity if the entry is authorized.
    pub fn bound_identity(&self) -> Option<Identity> {
        match self.state {
            IssuerState::Authorized { identity, .. } => Some(identity),
            IssuerState::Revoked { .. } => None,
        }
    }

    /// Whether the entry is currently authorized.
    pub fn is_authorized(&self) -> bool {
        self.bound_identity().is_some()
    }
}

/// `{key, authorized, identity}` status of one issuer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerStatus {
    /// `SHA-256(name)`.
    pub key: IssuerKey,
    /// Whether an authorized entry exists.
    pub authorized: bool,
    /// Bound identity, or zero.
    pub identity: Identity,
}

/// The issuer directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<IssuerKey, IssuerEntry>",
    into = "BTreeMap<IssuerKey, IssuerEntry>"
)]
pub struct IssuerDirectory {
    entries: BTreeMap<IssuerKey, IssuerEntry>,
    by_identity: BTreeMap<Identity, IssuerKey>,
}

impl IssuerDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry for `key`, authorized or not.
    pub fn get(&self, key: &IssuerKey) -> Option<&IssuerEntry> {
        self.entries.get(key)
    }

    /// The identity bound to `key`, if authorized.
    pub fn bound_identity(&self, key: &IssuerKey) -> Option<Identity> {
        self.entries.get(key).and_then(IssuerEntry::bound_identity)
    }

    /// Whether `key` has an authorized entry.
    pub fn is_authorized(&self, key: &IssuerKey) -> bool {
        self.bound_identity(key).is_some()
    }

    /// The key `identity` is bound to, if any.
    pub fn key_for_identity(&self, identity: &Identity) -> Option<IssuerKey> {
        self.by_identity.get(identity).copied()
    }

    /// `{key, authorized, identity}` for `key`.
    pub fn status(&self, key: IssuerKey) -> IssuerStatus {
        let identity = self.bound_identity(&key);
        IssuerStatus {
            key,
            authorized: identity.is_some(),
            identity: identity.unwrap_or(Identity::ZERO),
        }
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&IssuerKey, &IssuerEntry)> {
        self.entries.iter()
    }

    /// Number of entries ever created.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry was ever created.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of authorized entries.
    pub fn authorized_count(&self) -> usize {
        self.by_identity.len()
    }

    pub(crate) fn bind(&mut self, key: IssuerKey, name: String, identity: Identity, since: Timestamp) {
        self.entries.insert(
            key,
            IssuerEntry {
                name,
                state: IssuerState::Authorized { identity, since },
            },
        );
        self.by_identity.insert(identity, key);
    }

    /// Clear the binding of `key`, returning the identity that was bound.
    pub(crate) fn unbind(&mut self, key: &IssuerKey, at: Timestamp) -> Option<Identity> {
        let entry = self.entries.get_mut(key)?;
        let identity = entry.bound_identity()?;
        entry.state = IssuerState::Revoked {
            previous: identity,
            at,
        };
        self.by_identity.remove(&identity);
        Some(identity)
    }
}

impl TryFrom<BTreeMap<IssuerKey, IssuerEntry>> for IssuerDirectory {
    type Error = RegistryError;

    fn try_from(entries: BTreeMap<IssuerKey, IssuerEntry>) -> Result<Self, Self::Error> {
        let mut by_identity = BTreeMap::new();
        for (key, entry) in &entries {
            if let Some(identity) = entry.bound_identity() {
                if let Some(existing) = by_identity.insert(identity, *key) {
                    return Err(RegistryError::IdentityAlreadyBound {
                        identity,
                        key: existing,
                    });
                }
            }
        }
        Ok(Self {
            entries,
            by_identity,
        })
    }
}

impl From<IssuerDirectory> for BTreeMap<IssuerKey, IssuerEntry> {
    fn from(directory: IssuerDirectory) -> Self {
        directory.entries
    }
}
