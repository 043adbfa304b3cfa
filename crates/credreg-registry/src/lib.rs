//! # credreg-registry: Credential Registry Core
//!
//! An administrator-controlled allowlist of issuers, and a write-once store
//! of credential records those issuers create. Verification is a pure read
//! that any caller may perform.
//!
//! ## Components
//!
//! - **Access Control** (`access.rs`): two independent role relations
//!   (Administrator, Issuer) over caller identities.
//!
//! - **Issuer Directory** (`directory.rs`): `IssuerKey → (identity, state)`
//!   with a reverse `Identity → IssuerKey` index kept in lockstep.
//!
//! - **Credential Store** (`credential.rs`): write-once records with a
//!   monotonic `Active → Revoked` status.
//!
//! - **Registry** (`registry.rs`): the transition logic. Every mutation is
//!   planned against `&Registry` first and only committed once all checks
//!   pass, so a rejected call has no partial effect.
//!
//! - **Audit Journal** (`journal.rs`): one hash-chained record per committed
//!   mutation.
//!
//! - **Ledger** (`ledger.rs`): serializes mutations under a single writer
//!   lock and commits each state change together with its audit record.
//!
//! - **Snapshot Store** (`store.rs`): atomic JSON persistence of the ledger.
//!
//! ## Design Principles
//!
//! 1. **Construction enforces initialization.** A [`Registry`] cannot exist
//!    without its administrator.
//!
//! 2. **Reads never fail.** Queries return zero sentinels for absent data.
//!
//! 3. **Revocation is one-way.** A revoked credential never becomes active
//!    again; re-authorizing an issuer never touches existing records.

pub mod access;
pub mod credential;
pub mod directory;
pub mod error;
pub mod events;
pub mod journal;
pub mod ledger;
pub mod registry;
pub mod store;

pub use access::{AccessControl, Role};
pub use credential::{CredentialRecord, CredentialStatus, CredentialStore, CredentialView, Verification};
pub use directory::{IssuerDirectory, IssuerEntry, IssuerState, IssuerStatus};
pub use error::{ErrorKind, RegistryError};
pub use events::RegistryEvent;
pub use journal::{AuditJournal, AuditRecord, ChainIntegrity, JournalPage};
pub use ledger::{CallContext, Clock, Ledger, LedgerSnapshot, LedgerSummary, ManualClock, SystemClock};
pub use registry::{Registry, Transition};
pub use store::{SnapshotStore, StoreError};
