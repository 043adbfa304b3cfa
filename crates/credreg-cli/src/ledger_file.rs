//! Registry file access for the CLI.
//!
//! A registry file is a [`LedgerSnapshot`] managed through
//! [`SnapshotStore`]. Commands open it and run against an in-memory
//! [`Ledger`] that carries the store, so each mutation is written to the
//! file as part of its commit.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use credreg_registry::{AuditRecord, Ledger, LedgerSnapshot, RegistryError, SnapshotStore};

/// An opened registry file.
pub struct LedgerFile {
    ledger: Ledger,
}

impl LedgerFile {
    /// Open an existing registry file. Fails if the file is missing,
    /// malformed, or carries a broken audit chain.
    pub fn open(path: &Path) -> Result<Self> {
        let store = SnapshotStore::new(path);
        let snapshot = store
            .load()
            .with_context(|| format!("failed to load registry file: {}", path.display()))?
            .with_context(|| {
                format!(
                    "registry file not found: {} (create one with `credreg init`)",
                    path.display()
                )
            })?;
        Ok(Self {
            ledger: Ledger::from_snapshot(snapshot).with_store(Arc::new(store)),
        })
    }

    /// Create a new registry file from `snapshot`; refuses to overwrite.
    pub fn create(path: &Path, snapshot: LedgerSnapshot) -> Result<Self> {
        let store = SnapshotStore::new(path);
        store
            .create(&snapshot)
            .with_context(|| format!("failed to create registry file: {}", path.display()))?;
        Ok(Self {
            ledger: Ledger::from_snapshot(snapshot).with_store(Arc::new(store)),
        })
    }

    /// The in-memory ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Turn a mutation outcome into the committed record, or into a CLI
    /// error carrying the failure code.
    pub fn commit(&self, outcome: Result<AuditRecord, RegistryError>) -> Result<AuditRecord> {
        outcome.map_err(rejected)
    }
}

/// Read a registry file without checking its audit chain.
///
/// Used by `audit verify`, which reports on a broken chain instead of
/// refusing to open the file.
pub fn read_unchecked(path: &Path) -> Result<LedgerSnapshot> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read registry file: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse registry file: {}", path.display()))
}

fn rejected(err: RegistryError) -> anyhow::Error {
    anyhow!("{} [{}]", err, err.kind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use credreg_core::Identity;

    fn admin() -> Identity {
        Identity::from_bytes([0xAA; 20])
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = LedgerFile::open(&dir.path().join("missing.json"))
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("credreg init"));
    }

    #[test]
    fn create_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        LedgerFile::create(&path, LedgerSnapshot::genesis(admin()).unwrap()).unwrap();
        let file = LedgerFile::open(&path).unwrap();
        assert_eq!(file.ledger().summary().administrator, admin());
    }

    #[test]
    fn create_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        LedgerFile::create(&path, LedgerSnapshot::genesis(admin()).unwrap()).unwrap();
        assert!(LedgerFile::create(&path, LedgerSnapshot::genesis(admin()).unwrap()).is_err());
    }

    #[test]
    fn commit_persists_and_rejection_carries_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        let file =
            LedgerFile::create(&path, LedgerSnapshot::genesis(admin()).unwrap()).unwrap();

        let issuer = Identity::from_bytes([0x11; 20]);
        let outcome = file.ledger().authorize_issuer(admin(), "Acme", issuer);
        file.commit(outcome).unwrap();

        let reopened = LedgerFile::open(&path).unwrap();
        assert!(reopened.ledger().read(|reg, _| reg.is_issuer_authorized("Acme")));

        let outcome = file.ledger().authorize_issuer(admin(), "Acme", issuer);
        let err = file.commit(outcome).unwrap_err();
        assert!(err.to_string().contains("ALREADY_AUTHORIZED"));
    }

    #[test]
    fn unwritable_file_leaves_ledger_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir(&data).unwrap();
        let path = data.join("registry.json");
        let file =
            LedgerFile::create(&path, LedgerSnapshot::genesis(admin()).unwrap()).unwrap();
        std::fs::remove_dir_all(&data).unwrap();

        let outcome = file
            .ledger()
            .authorize_issuer(admin(), "Acme", Identity::from_bytes([0x11; 20]));
        let err = file.commit(outcome).unwrap_err();
        assert!(err.to_string().contains("INTERNAL"));
        assert!(!file.ledger().read(|reg, _| reg.is_issuer_authorized("Acme")));
        assert_eq!(file.ledger().summary().journal_length, 0);
    }

    #[test]
    fn read_unchecked_accepts_tampered_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        let file =
            LedgerFile::create(&path, LedgerSnapshot::genesis(admin()).unwrap()).unwrap();
        let outcome = file
            .ledger()
            .authorize_issuer(admin(), "Acme", Identity::from_bytes([0x11; 20]));
        file.commit(outcome).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        value["journal"][0]["caller"] = serde_json::json!(Identity::from_bytes([0x22; 20]));
        std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        assert!(LedgerFile::open(&path).is_err());
        let snapshot = read_unchecked(&path).unwrap();
        assert!(!snapshot.journal.verify_chain().chain_valid);
    }
}
