//! # Ledger Substrate
//!
//! The in-process execution context the registry runs on. It provides the
//! four things the registry consumes: a stable caller identity per
//! invocation, the current time, serialized all-or-nothing execution, and
//! an audit record committed in the same unit as the state change.
//!
//! ## Locking
//!
//! One `parking_lot::RwLock` guards the registry and the journal together.
//! [`Ledger::execute`] holds the write lock from planning through commit, so
//! mutations form a strict total order and a reader observes state strictly
//! before or after any write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use credreg_core::{CategoryTag, ContentDigest, CredentialKey, Identity, Timestamp};

use crate::access::Role;
use crate::credential::Verification;
use crate::error::RegistryError;
use crate::journal::{AuditJournal, AuditRecord};
use crate::registry::{Registry, Transition};
use crate::store::SnapshotStore;

/// Source of "current time" for transitions.
pub trait Clock: Send + Sync {
    /// The current ledger time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    /// A clock reading `start`.
    pub fn new(start: Timestamp) -> Self {
        Self(AtomicU64::new(start.as_unix_secs()))
    }

    /// Set the reading.
    pub fn set(&self, to: Timestamp) {
        self.0.store(to.as_unix_secs(), Ordering::SeqCst);
    }

    /// Move the reading forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_unix_secs(self.0.load(Ordering::SeqCst))
    }
}

/// Per-invocation execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The invoking identity.
    pub caller: Identity,
    /// Ledger time of the invocation.
    pub now: Timestamp,
}

/// Everything the ledger persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Registry state.
    pub registry: Registry,
    /// Audit records of every committed mutation, oldest first.
    pub journal: AuditJournal,
}

impl LedgerSnapshot {
    /// A fresh ledger administered by `administrator`.
    pub fn genesis(administrator: Identity) -> Result<Self, RegistryError> {
        Ok(Self {
            registry: Registry::new(administrator)?,
            journal: AuditJournal::new(),
        })
    }

    /// Number of committed mutations.
    pub fn sequence(&self) -> u64 {
        self.journal.len() as u64
    }

    /// Registry overview.
    pub fn summary(&self) -> LedgerSummary {
        let registry = &self.registry;
        LedgerSummary {
            administrator: registry.administrator(),
            administrator_role: Role::Administrator.tag(),
            issuer_role: Role::Issuer.tag(),
            issuers_authorized: registry.directory().authorized_count(),
            issuers_known: registry.directory().len(),
            credentials_issued: registry.credentials().len(),
            credentials_revoked: registry.credentials().revoked_count(),
            journal_length: self.journal.len(),
            head_digest: self.journal.head(),
        }
    }
}

/// Registry overview for operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Holder of the Administrator role.
    pub administrator: Identity,
    /// Tag of the Administrator role.
    pub administrator_role: ContentDigest,
    /// Tag of the Issuer role.
    pub issuer_role: ContentDigest,
    /// Directory entries currently authorized.
    pub issuers_authorized: usize,
    /// Directory entries ever created, authorized or revoked.
    pub issuers_known: usize,
    /// Credential records, revoked ones included.
    pub credentials_issued: usize,
    /// Credential records marked revoked.
    pub credentials_revoked: usize,
    /// Audit records in the journal.
    pub journal_length: usize,
    /// Digest of the newest audit record, zero when empty.
    pub head_digest: ContentDigest,
}

/// Serialized registry host.
pub struct Ledger {
    state: RwLock<LedgerSnapshot>,
    clock: Arc<dyn Clock>,
    // Written under the write lock before a mutation becomes visible.
    store: Option<Arc<SnapshotStore>>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("sequence", &self.state.read().sequence())
            .field("store", &self.store.as_ref().map(|s| s.path().to_path_buf()))
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// A fresh ledger on the system clock.
    pub fn new(administrator: Identity) -> Result<Self, RegistryError> {
        Ok(Self::from_snapshot(LedgerSnapshot::genesis(administrator)?))
    }

    /// Resume from a snapshot on the system clock.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self::with_clock(snapshot, Arc::new(SystemClock))
    }

    /// Resume from a snapshot on a custom clock.
    pub fn with_clock(snapshot: LedgerSnapshot, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(snapshot),
            clock,
            store: None,
        }
    }

    /// Persist every mutation to `store` as part of its commit. A mutation
    /// whose snapshot cannot be written fails with
    /// [`RegistryError::Persist`] and leaves the ledger unchanged.
    pub fn with_store(mut self, store: Arc<SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The attached snapshot store, if any.
    pub fn store(&self) -> Option<&SnapshotStore> {
        self.store.as_deref()
    }

    /// Plan and commit one mutation as `caller`.
    ///
    /// The audit record is sealed before the registry is touched. With a
    /// store attached, the next state is built on a copy and written out
    /// first; it replaces the live state only once the write succeeded. Any
    /// failure leaves registry, journal, and file as they were.
    pub fn execute<F>(
        &self,
        operation: &'static str,
        caller: Identity,
        plan: F,
    ) -> Result<AuditRecord, RegistryError>
    where
        F: FnOnce(&Registry, &CallContext) -> Result<Transition, RegistryError>,
    {
        let mut state = self.state.write();
        let ctx = CallContext {
            caller,
            now: self.clock.now(),
        };

        let outcome = plan(&state.registry, &ctx).and_then(|transition| {
            let record = state.journal.prepare(ctx.now, caller, transition.event())?;
            self.apply(&mut state, transition, record)
        });
        drop(state);

        match outcome {
            Ok(record) => {
                metrics::counter!(
                    "credreg_mutations_total",
                    "operation" => operation,
                    "outcome" => "committed"
                )
                .increment(1);
                tracing::info!(
                    operation,
                    sequence = record.sequence,
                    caller = %caller,
                    event = record.event.name(),
                    "mutation committed"
                );
                Ok(record)
            }
            Err(err) => {
                let kind = err.kind();
                metrics::counter!(
                    "credreg_mutations_total",
                    "operation" => operation,
                    "outcome" => kind.as_str()
                )
                .increment(1);
                if matches!(err, RegistryError::Persist(_)) {
                    tracing::error!(operation, caller = %caller, error = %err, "mutation rolled back");
                } else {
                    tracing::debug!(operation, caller = %caller, code = kind.as_str(), error = %err, "mutation rejected");
                }
                Err(err)
            }
        }
    }

    fn apply(
        &self,
        state: &mut LedgerSnapshot,
        transition: Transition,
        record: AuditRecord,
    ) -> Result<AuditRecord, RegistryError> {
        match &self.store {
            None => {
                state.registry.commit(transition);
                state.journal.push(record.clone());
            }
            Some(store) => {
                let mut next = state.clone();
                next.registry.commit(transition);
                next.journal.push(record.clone());
                store.save(&next)?;
                *state = next;
            }
        }
        Ok(record)
    }

    /// Authorize `identity` as issuer `name`. Administrator only.
    pub fn authorize_issuer(
        &self,
        caller: Identity,
        name: &str,
        identity: Identity,
    ) -> Result<AuditRecord, RegistryError> {
        self.execute("authorize_issuer", caller, |reg, ctx| {
            reg.plan_authorize_issuer(ctx, name, identity)
        })
    }

    /// Revoke issuer `name`. Administrator only.
    pub fn revoke_issuer(&self, caller: Identity, name: &str) -> Result<AuditRecord, RegistryError> {
        self.execute("revoke_issuer", caller, |reg, ctx| reg.plan_revoke_issuer(ctx, name))
    }

    /// Issue a credential as `caller` under `issuer_name`.
    pub fn issue_credential(
        &self,
        caller: Identity,
        credential: CredentialKey,
        issuer_name: &str,
        category: CategoryTag,
    ) -> Result<AuditRecord, RegistryError> {
        self.execute("issue_credential", caller, |reg, ctx| {
            reg.plan_issue_credential(ctx, credential, issuer_name, category)
        })
    }

    /// Revoke a credential as `caller`.
    pub fn revoke_credential(
        &self,
        caller: Identity,
        credential: CredentialKey,
        issuer_name: &str,
    ) -> Result<AuditRecord, RegistryError> {
        self.execute("revoke_credential", caller, |reg, ctx| {
            reg.plan_revoke_credential(ctx, credential, issuer_name)
        })
    }

    /// Verify a credential. Open to any caller; never fails.
    pub fn verify_credential(&self, credential: &CredentialKey, issuer_name: &str) -> Verification {
        let verification = self.state.read().registry.verify_credential(credential, issuer_name);
        metrics::counter!("credreg_verifications_total", "outcome" => verification.outcome())
            .increment(1);
        tracing::debug!(credential = %credential, outcome = verification.outcome(), "credential verified");
        verification
    }

    /// Run a read-only query under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Registry, &AuditJournal) -> R) -> R {
        let state = self.state.read();
        f(&state.registry, &state.journal)
    }

    /// Clone the full state for persistence.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().clone()
    }

    /// Registry overview.
    pub fn summary(&self) -> LedgerSummary {
        self.state.read().summary()
    }

    /// Current ledger time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::events::RegistryEvent;
    use credreg_core::{category_tag, credential_key};

    fn id(b: u8) -> Identity {
        Identity::from_bytes([b; 20])
    }

    fn ledger() -> (Ledger, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(1_000)));
        let snapshot = LedgerSnapshot::genesis(id(1)).unwrap();
        (Ledger::with_clock(snapshot, clock.clone()), clock)
    }

    #[test]
    fn commit_appends_one_record_per_mutation() {
        let (ledger, clock) = ledger();
        let first = ledger.authorize_issuer(id(1), "Acme", id(2)).unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.recorded_at, Timestamp::from_unix_secs(1_000));

        clock.advance(60);
        let second = ledger
            .issue_credential(id(2), credential_key("cert-1"), "Acme", category_tag("BACHELOR"))
            .unwrap();
        assert_eq!(second.previous_digest, first.digest);
        assert!(matches!(
            second.event,
            RegistryEvent::CredentialIssued { timestamp, .. } if timestamp == Timestamp::from_unix_secs(1_060)
        ));

        let summary = ledger.summary();
        assert_eq!(summary.journal_length, 2);
        assert_eq!(summary.head_digest, second.digest);
        assert_eq!(summary.credentials_issued, 1);
    }

    #[test]
    fn rejection_appends_nothing() {
        let (ledger, _) = ledger();
        let before = ledger.snapshot();
        let err = ledger.authorize_issuer(id(9), "Acme", id(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn verification_reads_without_journal_entry() {
        let (ledger, _) = ledger();
        let v = ledger.verify_credential(&credential_key("nope"), "Acme");
        assert!(!v.exists);
        assert_eq!(ledger.read(|_, journal| journal.len()), 0);
    }

    #[test]
    fn concurrent_issuance_of_one_key_commits_once() {
        let (ledger, _) = ledger();
        let ledger = Arc::new(ledger);
        for (i, name) in ["A", "B", "C", "D"].iter().enumerate() {
            ledger.authorize_issuer(id(1), name, id(10 + i as u8)).unwrap();
        }

        let handles: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let ledger = ledger.clone();
                let name = name.to_string();
                std::thread::spawn(move || {
                    ledger
                        .issue_credential(id(10 + i as u8), credential_key("shared"), &name, CategoryTag::ZERO)
                        .is_ok()
                })
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert!(ledger.read(|_, journal| journal.verify_chain().chain_valid));
    }

    #[test]
    fn failed_snapshot_write_applies_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir(&data).unwrap();
        let store = Arc::new(SnapshotStore::new(data.join("registry.json")));
        let (ledger, _) = ledger();
        let ledger = ledger.with_store(store.clone());

        std::fs::remove_dir(&data).unwrap();
        let before = ledger.snapshot();
        let err = ledger.authorize_issuer(id(1), "Acme", id(2)).unwrap_err();
        assert!(matches!(err, RegistryError::Persist(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(ledger.snapshot(), before);
        assert!(!ledger.read(|reg, _| reg.is_issuer_authorized("Acme")));

        // Once the directory is back the same call commits as the first record.
        std::fs::create_dir(&data).unwrap();
        let record = ledger.authorize_issuer(id(1), "Acme", id(2)).unwrap();
        assert_eq!(record.sequence, 1);
        assert_eq!(store.load().unwrap().unwrap(), ledger.snapshot());
    }

    #[test]
    fn attached_store_holds_every_commit() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SnapshotStore::new(dir.path().join("registry.json")));
        let (ledger, _) = ledger();
        let ledger = ledger.with_store(store.clone());

        ledger.authorize_issuer(id(1), "Acme", id(2)).unwrap();
        ledger
            .issue_credential(id(2), credential_key("cert-1"), "Acme", category_tag("BACHELOR"))
            .unwrap();
        assert!(ledger.authorize_issuer(id(1), "Acme", id(3)).is_err());

        let saved = SnapshotStore::new(store.path()).load().unwrap().unwrap();
        assert_eq!(saved.sequence(), 2);
        assert_eq!(saved, ledger.snapshot());
    }

    #[test]
    fn counters_carry_operation_and_outcome() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let (ledger, _) = ledger();
            ledger.authorize_issuer(id(1), "Acme", id(2)).unwrap();
            let key = credential_key("cert-1");
            ledger.issue_credential(id(2), key, "Acme", CategoryTag::ZERO).unwrap();
            ledger
                .issue_credential(id(2), key, "Acme", CategoryTag::ZERO)
                .unwrap_err();
            ledger.verify_credential(&credential_key("never"), "Acme");
            ledger.verify_credential(&key, "Acme");
        });

        let rendered = handle.render();
        for line in [
            r#"credreg_mutations_total{operation="authorize_issuer",outcome="committed"} 1"#,
            r#"credreg_mutations_total{operation="issue_credential",outcome="committed"} 1"#,
            r#"credreg_mutations_total{operation="issue_credential",outcome="ALREADY_EXISTS"} 1"#,
            r#"credreg_verifications_total{outcome="absent"} 1"#,
            r#"credreg_verifications_total{outcome="valid"} 1"#,
        ] {
            assert!(rendered.contains(line), "missing {line} in:\n{rendered}");
        }
    }

    #[test]
    fn snapshot_serde_preserves_chain() {
        let (ledger, _) = ledger();
        ledger.authorize_issuer(id(1), "Acme", id(2)).unwrap();
        ledger.revoke_issuer(id(1), "Acme").unwrap();
        let json = serde_json::to_string(&ledger.snapshot()).unwrap();
        let back: LedgerSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sequence(), 2);
        assert!(back.journal.verify_chain().chain_valid);
    }
}
