//! # credreg-cli: Operator CLI for the Credential Registry
//!
//! Provides the `credreg` command-line interface over a local registry file
//! (a JSON ledger snapshot). Every mutating command loads the file, runs one
//! registry transition as the identity given with `--as`, and writes the
//! file back atomically.
//!
//! ## Subcommands
//!
//! - `credreg init` / `credreg info`: Registry file creation and overview.
//! - `credreg key`: Issuer key, credential key, and category tag derivation.
//! - `credreg identity`: Ed25519 keypair generation.
//! - `credreg issuer`: Issuer authorization, revocation, status.
//! - `credreg credential`: Credential issuance, revocation, verification.
//! - `credreg audit`: Audit journal listing and chain verification.
//! - `credreg seed`: Sample data.
//!
//! ```bash
//! credreg init --admin 0x9f...
//! credreg --as 0x9f... issuer authorize "Acme University" 0x3c...
//! credreg --as 0x3c... credential issue --issuer "Acme University" \
//!     --content "Jane Doe - BSc - 2024" --category BACHELOR
//! credreg credential verify --issuer "Acme University" --content "Jane Doe - BSc - 2024"
//! ```

pub mod audit;
pub mod credential;
pub mod identity;
pub mod issuer;
pub mod key;
pub mod ledger_file;
pub mod registry;
pub mod seed;

use std::path::PathBuf;

use anyhow::{Context, Result};

use credreg_core::Identity;
use credreg_registry::AuditRecord;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Registry file.
    pub ledger: PathBuf,
    /// Identity asserted with `--as`.
    pub caller: Option<Identity>,
}

impl CliContext {
    /// The acting identity; mutating commands cannot run without one.
    pub fn caller(&self) -> Result<Identity> {
        self.caller
            .context("this command acts on the registry; pass --as <identity>")
    }
}

/// Print the audit trail entry of a committed mutation.
pub(crate) fn print_record(record: &AuditRecord) {
    println!("  Sequence: {}", record.sequence);
    println!("  Recorded: {}", record.recorded_at);
    println!("  Digest:   {}", record.digest);
}
