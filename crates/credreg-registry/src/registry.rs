//! # Registry Transitions and Queries
//!
//! Each mutation is split into a `plan_*` method that runs every check
//! against `&self` and yields a [`Transition`], and [`Registry::commit`],
//! which applies a planned transition infallibly. The ledger seals the audit
//! record between the two, so the state change and its record commit
//! together or not at all.
//!
//! ## Check Order
//!
//! ```text
//! authorize_issuer   administrator → non-empty name → non-zero identity
//!                    → AlreadyAuthorized → IdentityAlreadyBound
//! revoke_issuer      administrator → NotAuthorized
//! issue_credential   NotAuthorizedIssuer → zero key → AlreadyExists
//! revoke_credential  NotFound → NotIssuingParty → AlreadyRevoked
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use credreg_core::{issuer_key, CategoryTag, CredentialKey, Identity, IssuerKey, Timestamp};

use crate::access::{AccessControl, Role};
use crate::credential::{CredentialRecord, CredentialStatus, CredentialStore, CredentialView, Verification};
use crate::directory::{IssuerDirectory, IssuerEntry, IssuerStatus};
use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::ledger::CallContext;

/// A checked, not yet applied, state change.
///
/// Only the `plan_*` methods of [`Registry`] construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition(Change);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    AuthorizeIssuer {
        key: IssuerKey,
        name: String,
        identity: Identity,
        at: Timestamp,
    },
    RevokeIssuer {
        key: IssuerKey,
        name: String,
        at: Timestamp,
    },
    IssueCredential {
        key: CredentialKey,
        record: CredentialRecord,
    },
    RevokeCredential {
        key: CredentialKey,
        issuer_key: IssuerKey,
        at: Timestamp,
    },
}

impl Transition {
    /// The event this transition emits when committed.
    pub fn event(&self) -> RegistryEvent {
        match &self.0 {
            Change::AuthorizeIssuer {
                key,
                name,
                identity,
                ..
            } => RegistryEvent::IssuerAuthorized {
                key: *key,
                name: name.clone(),
                identity: *identity,
            },
            Change::RevokeIssuer { key, name, .. } => RegistryEvent::IssuerRevoked {
                key: *key,
                name: name.clone(),
            },
            Change::IssueCredential { key, record } => RegistryEvent::CredentialIssued {
                credential_key: *key,
                issuer_key: record.issuer_key,
                timestamp: record.issued_at,
            },
            Change::RevokeCredential {
                key, issuer_key, ..
            } => RegistryEvent::CredentialRevoked {
                credential_key: *key,
                issuer_key: *issuer_key,
            },
        }
    }
}

/// The registry: access control, issuer directory and credential store.
///
/// Deserialization checks that the three parts agree: the Issuer role set
/// equals the identities bound by authorized directory entries, and every
/// credential names an issuer the directory holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRegistry")]
pub struct Registry {
    access: AccessControl,
    directory: IssuerDirectory,
    credentials: CredentialStore,
}

#[derive(Deserialize)]
struct RawRegistry {
    access: AccessControl,
    directory: IssuerDirectory,
    credentials: CredentialStore,
}

impl TryFrom<RawRegistry> for Registry {
    type Error = RegistryError;

    fn try_from(raw: RawRegistry) -> Result<Self, Self::Error> {
        if raw.access.administrator().is_zero() {
            return Err(RegistryError::ZeroIdentity);
        }

        let bound: BTreeSet<Identity> = raw
            .directory
            .iter()
            .filter_map(|(_, entry)| entry.bound_identity())
            .collect();
        if let Some(identity) = raw.access.issuers().symmetric_difference(&bound).next() {
            return Err(RegistryError::RoleMismatch {
                identity: *identity,
            });
        }

        for (key, record) in raw.credentials.iter() {
            if raw.directory.get(&record.issuer_key).is_none() {
                return Err(RegistryError::UnknownIssuer {
                    key: *key,
                    issuer_key: record.issuer_key,
                });
            }
        }

        Ok(Self {
            access: raw.access,
            directory: raw.directory,
            credentials: raw.credentials,
        })
    }
}

impl Registry {
    /// Create a registry administered by `administrator`.
    pub fn new(administrator: Identity) -> Result<Self, RegistryError> {
        if administrator.is_zero() {
            return Err(RegistryError::ZeroIdentity);
        }
        Ok(Self {
            access: AccessControl::new(administrator),
            directory: IssuerDirectory::new(),
            credentials: CredentialStore::new(),
        })
    }

    // ─── Issuer lifecycle ───────────────────────────────────────────

    /// Check an issuer authorization.
    pub fn plan_authorize_issuer(
        &self,
        ctx: &CallContext,
        name: &str,
        identity: Identity,
    ) -> Result<Transition, RegistryError> {
        self.access.require_role(ctx.caller, Role::Administrator)?;
        if name.is_empty() {
            return Err(RegistryError::EmptyIssuerName);
        }
        if identity.is_zero() {
            return Err(RegistryError::ZeroIdentity);
        }
        let key = issuer_key(name);
        if self.directory.is_authorized(&key) {
            return Err(RegistryError::AlreadyAuthorized {
                name: name.to_string(),
            });
        }
        if let Some(bound) = self.directory.key_for_identity(&identity) {
            return Err(RegistryError::IdentityAlreadyBound {
                identity,
                key: bound,
            });
        }
        Ok(Transition(Change::AuthorizeIssuer {
            key,
            name: name.to_string(),
            identity,
            at: ctx.now,
        }))
    }

    /// Check an issuer revocation.
    pub fn plan_revoke_issuer(
        &self,
        ctx: &CallContext,
        name: &str,
    ) -> Result<Transition, RegistryError> {
        self.access.require_role(ctx.caller, Role::Administrator)?;
        let key = issuer_key(name);
        if !self.directory.is_authorized(&key) {
            return Err(RegistryError::NotAuthorized {
                name: name.to_string(),
            });
        }
        Ok(Transition(Change::RevokeIssuer {
            key,
            name: name.to_string(),
            at: ctx.now,
        }))
    }

    // ─── Credential lifecycle ───────────────────────────────────────

    /// Check a credential issuance by `ctx.caller` under `issuer_name`.
    pub fn plan_issue_credential(
        &self,
        ctx: &CallContext,
        credential: CredentialKey,
        issuer_name: &str,
        category: CategoryTag,
    ) -> Result<Transition, RegistryError> {
        let key = issuer_key(issuer_name);
        if self.directory.bound_identity(&key) != Some(ctx.caller) {
            return Err(RegistryError::NotAuthorizedIssuer {
                caller: ctx.caller,
                name: issuer_name.to_string(),
            });
        }
        if credential.is_zero() {
            return Err(RegistryError::InvalidKey);
        }
        if self.credentials.contains(&credential) {
            return Err(RegistryError::AlreadyExists { key: credential });
        }
        Ok(Transition(Change::IssueCredential {
            key: credential,
            record: CredentialRecord {
                issuer: ctx.caller,
                issuer_key: key,
                issued_at: ctx.now,
                category,
                status: CredentialStatus::Active,
            },
        }))
    }

    /// Check a credential revocation. The caller must be the stored issuer
    /// and `issuer_name` must hash to the stored issuer key; the issuer need
    /// not still be authorized.
    pub fn plan_revoke_credential(
        &self,
        ctx: &CallContext,
        credential: CredentialKey,
        issuer_name: &str,
    ) -> Result<Transition, RegistryError> {
        let record = self
            .credentials
            .get(&credential)
            .ok_or(RegistryError::NotFound { key: credential })?;
        let key = issuer_key(issuer_name);
        if record.issuer != ctx.caller || record.issuer_key != key {
            return Err(RegistryError::NotIssuingParty {
                caller: ctx.caller,
                key: credential,
            });
        }
        if record.is_revoked() {
            return Err(RegistryError::AlreadyRevoked { key: credential });
        }
        Ok(Transition(Change::RevokeCredential {
            key: credential,
            issuer_key: key,
            at: ctx.now,
        }))
    }

    /// Apply a planned transition and return its event.
    ///
    /// Must be called against the same state the transition was planned on;
    /// the ledger guarantees this by holding its write lock across both.
    pub(crate) fn commit(&mut self, transition: Transition) -> RegistryEvent {
        let event = transition.event();
        match transition.0 {
            Change::AuthorizeIssuer {
                key,
                name,
                identity,
                at,
            } => {
                self.directory.bind(key, name, identity, at);
                self.access.grant_issuer_role(identity);
            }
            Change::RevokeIssuer { key, at, .. } => {
                if let Some(identity) = self.directory.unbind(&key, at) {
                    self.access.revoke_issuer_role(identity);
                }
            }
            Change::IssueCredential { key, record } => {
                self.credentials.insert_new(key, record);
            }
            Change::RevokeCredential { key, at, .. } => {
                self.credentials.mark_revoked(&key, at);
            }
        }
        event
    }

    // ─── Direct mutation (plan + commit, no journal) ────────────────

    /// Authorize `identity` as issuer `name`.
    pub fn authorize_issuer(
        &mut self,
        ctx: &CallContext,
        name: &str,
        identity: Identity,
    ) -> Result<RegistryEvent, RegistryError> {
        let transition = self.plan_authorize_issuer(ctx, name, identity)?;
        Ok(self.commit(transition))
    }

    /// Revoke the authorization of issuer `name`.
    pub fn revoke_issuer(&mut self, ctx: &CallContext, name: &str) -> Result<RegistryEvent, RegistryError> {
        let transition = self.plan_revoke_issuer(ctx, name)?;
        Ok(self.commit(transition))
    }

    /// Issue a credential.
    pub fn issue_credential(
        &mut self,
        ctx: &CallContext,
        credential: CredentialKey,
        issuer_name: &str,
        category: CategoryTag,
    ) -> Result<RegistryEvent, RegistryError> {
        let transition = self.plan_issue_credential(ctx, credential, issuer_name, category)?;
        Ok(self.commit(transition))
    }

    /// Revoke a credential.
    pub fn revoke_credential(
        &mut self,
        ctx: &CallContext,
        credential: CredentialKey,
        issuer_name: &str,
    ) -> Result<RegistryEvent, RegistryError> {
        let transition = self.plan_revoke_credential(ctx, credential, issuer_name)?;
        Ok(self.commit(transition))
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// The administrator identity.
    pub fn administrator(&self) -> Identity {
        self.access.administrator()
    }

    /// Whether `identity` holds `role`.
    pub fn has_role(&self, identity: Identity, role: Role) -> bool {
        self.access.has_role(identity, role)
    }

    /// Whether issuer `name` is authorized.
    pub fn is_issuer_authorized(&self, name: &str) -> bool {
        self.directory.is_authorized(&issuer_key(name))
    }

    /// Identity bound to issuer `name`, or zero.
    pub fn issuer_address(&self, name: &str) -> Identity {
        self.directory
            .bound_identity(&issuer_key(name))
            .unwrap_or(Identity::ZERO)
    }

    /// Issuer key bound to `identity`, or zero.
    pub fn issuer_key_by_identity(&self, identity: Identity) -> IssuerKey {
        self.directory
            .key_for_identity(&identity)
            .unwrap_or(IssuerKey::ZERO)
    }

    /// `{key, authorized, identity}` for issuer `name`.
    pub fn issuer_status(&self, name: &str) -> IssuerStatus {
        self.directory.status(issuer_key(name))
    }

    /// Directory entry for `key`.
    pub fn issuer_entry(&self, key: &IssuerKey) -> Option<&IssuerEntry> {
        self.directory.get(key)
    }

    /// Full record view of `credential`, or the all-zero sentinel.
    pub fn credential_record(&self, credential: &CredentialKey) -> CredentialView {
        self.credentials.view(credential)
    }

    /// Verify `credential` against the claimed issuer name. Never fails.
    pub fn verify_credential(&self, credential: &CredentialKey, issuer_name: &str) -> Verification {
        Verification::of(&self.credentials.view(credential), &issuer_key(issuer_name))
    }

    /// Access control relations.
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// The issuer directory.
    pub fn directory(&self) -> &IssuerDirectory {
        &self.directory
    }

    /// The credential store.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }
}
