//! # Credential Store
//!
//! Write-once credential records keyed by [`CredentialKey`]. The payload
//! (issuer, issuer key, issuance time, category) is fixed at creation; only
//! the status moves, and only from `Active` to `Revoked`. Records are never
//! deleted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use credreg_core::{CategoryTag, CredentialKey, Identity, IssuerKey, Timestamp};

/// Lifecycle status of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CredentialStatus {
    /// Valid, subject to issuer-name match.
    Active,
    /// Revoked at `at`. Terminal.
    Revoked {
        /// When the revocation was committed.
        at: Timestamp,
    },
}

/// A stored credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Identity that issued the credential.
    pub issuer: Identity,
    /// Directory key the credential was issued under.
    pub issuer_key: IssuerKey,
    /// Ledger time of issuance.
    pub issued_at: Timestamp,
    /// Degree/category tag.
    pub category: CategoryTag,
    /// Current status.
    #[serde(flatten)]
    pub status: CredentialStatus,
}

impl CredentialRecord {
    /// Whether the record has been revoked.
    pub fn is_revoked(&self) -> bool {
        matches!(self.status, CredentialStatus::Revoked { .. })
    }
}

/// Flat read view of a credential, with an all-zero sentinel for absent keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialView {
    /// Whether a record exists.
    pub exists: bool,
    /// Whether the record is revoked.
    pub revoked: bool,
    /// Issuing identity, or zero.
    pub issuer: Identity,
    /// Issuance time, or zero.
    pub issued_at: Timestamp,
    /// Category tag, or zero.
    pub category: CategoryTag,
    /// Issuer key, or zero.
    pub issuer_key: IssuerKey,
}

impl CredentialView {
    /// The view returned for a key with no record.
    pub const fn absent() -> Self {
        Self {
            exists: false,
            revoked: false,
            issuer: Identity::ZERO,
            issued_at: Timestamp::ZERO,
            category: CategoryTag::ZERO,
            issuer_key: IssuerKey::ZERO,
        }
    }
}

impl From<&CredentialRecord> for CredentialView {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            exists: true,
            revoked: record.is_revoked(),
            issuer: record.issuer,
            issued_at: record.issued_at,
            category: record.category,
            issuer_key: record.issuer_key,
        }
    }
}

/// Result of a verification query.
///
/// `is_valid = exists && !revoked && stored issuer key == SHA-256(issuer name)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Whether the credential exists, is unrevoked and was issued under the
    /// claimed issuer name.
    pub is_valid: bool,
    /// Whether a record exists for the key.
    pub exists: bool,
    /// Issuing identity, zero when absent.
    pub issuer: Identity,
    /// Issuance time, zero when absent.
    pub issued_at: Timestamp,
    /// Whether the record is revoked.
    pub revoked: bool,
    /// Category tag, zero when absent.
    pub category: CategoryTag,
}

impl Verification {
    /// Verify `view` against the issuer key derived from the claimed name.
    pub fn of(view: &CredentialView, claimed_issuer: &IssuerKey) -> Self {
        Self {
            is_valid: view.exists && !view.revoked && view.issuer_key == *claimed_issuer,
            exists: view.exists,
            issuer: view.issuer,
            issued_at: view.issued_at,
            revoked: view.revoked,
            category: view.category,
        }
    }

    /// Metrics/log label: `valid`, `invalid` or `absent`.
    pub fn outcome(&self) -> &'static str {
        if self.is_valid {
            "valid"
        } else if self.exists {
            "invalid"
        } else {
            "absent"
        }
    }
}

/// The credential table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialStore {
    records: BTreeMap<CredentialKey, CredentialRecord>,
}

impl CredentialStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record stored under `key`.
    pub fn get(&self, key: &CredentialKey) -> Option<&CredentialRecord> {
        self.records.get(key)
    }

    /// Whether a record exists under `key`.
    pub fn contains(&self, key: &CredentialKey) -> bool {
        self.records.contains_key(key)
    }

    /// Flat view of `key`, or [`CredentialView::absent`].
    pub fn view(&self, key: &CredentialKey) -> CredentialView {
        self.records
            .get(key)
            .map(CredentialView::from)
            .unwrap_or_else(CredentialView::absent)
    }

    /// All records in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CredentialKey, &CredentialRecord)> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of revoked records.
    pub fn revoked_count(&self) -> usize {
        self.records.values().filter(|r| r.is_revoked()).count()
    }

    // Callers check absence first; an existing record is never overwritten.
    pub(crate) fn insert_new(&mut self, key: CredentialKey, record: CredentialRecord) -> bool {
        match self.records.entry(key) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub(crate) fn mark_revoked(&mut self, key: &CredentialKey, at: Timestamp) -> bool {
        match self.records.get_mut(key) {
            Some(record) if !record.is_revoked() => {
                record.status = CredentialStatus::Revoked { at };
                true
            }
            _ => false,
        }
    }
}
