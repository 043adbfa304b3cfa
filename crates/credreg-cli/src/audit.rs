//! # Audit Subcommand
//!
//! Lists audit records and verifies the hash chain of a registry file.
//! `audit verify` reads the file without the load-time chain check so it can
//! report on a tampered journal; it exits 2 when the chain is broken.

use anyhow::Result;
use clap::{Args, Subcommand};

use credreg_core::{issuer_key, CredentialKey};
use credreg_registry::{AuditRecord, RegistryEvent};

use crate::ledger_file::{read_unchecked, LedgerFile};
use crate::CliContext;

/// Exit code of `audit verify` for a broken chain.
pub const EXIT_BROKEN_CHAIN: u8 = 2;

/// Arguments for `credreg audit`.
#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands.
#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// List audit records, oldest first.
    List {
        /// Only records touching this credential key.
        #[arg(long, conflicts_with = "issuer")]
        credential: Option<CredentialKey>,
        /// Only records touching this issuer name.
        #[arg(long)]
        issuer: Option<String>,
    },
    /// Recompute every digest and check the chain links.
    Verify,
}

/// Execute the audit subcommand.
pub fn run_audit(args: &AuditArgs, ctx: &CliContext) -> Result<u8> {
    match &args.command {
        AuditCommand::List { credential, issuer } => {
            cmd_list(ctx, credential.as_ref(), issuer.as_deref())
        }
        AuditCommand::Verify => cmd_verify(ctx),
    }
}

fn cmd_list(ctx: &CliContext, credential: Option<&CredentialKey>, issuer: Option<&str>) -> Result<u8> {
    let file = LedgerFile::open(&ctx.ledger)?;
    file.ledger().read(|_, journal| {
        let records: Vec<&AuditRecord> = match (credential, issuer) {
            (Some(key), _) => journal.for_credential(key),
            (None, Some(name)) => journal.for_issuer(&issuer_key(name)),
            (None, None) => journal.records().iter().collect(),
        };

        if records.is_empty() {
            println!("No audit records found.");
            return;
        }
        println!("Audit records ({}):", records.len());
        for record in records {
            println!(
                "  #{} {} {} by {}",
                record.sequence,
                record.recorded_at,
                describe(&record.event),
                record.caller
            );
        }
    });
    Ok(0)
}

fn cmd_verify(ctx: &CliContext) -> Result<u8> {
    let snapshot = read_unchecked(&ctx.ledger)?;
    let integrity = snapshot.journal.verify_chain();

    if integrity.chain_valid {
        println!("OK: audit chain is intact");
    } else {
        println!(
            "FAIL: audit chain has {} broken link(s)",
            integrity.broken_links
        );
    }
    println!("  Records: {}", integrity.total_records);
    println!("  Head:    {}", integrity.head);

    Ok(if integrity.chain_valid {
        0
    } else {
        EXIT_BROKEN_CHAIN
    })
}

fn describe(event: &RegistryEvent) -> String {
    match event {
        RegistryEvent::IssuerAuthorized { name, identity, .. } => {
            format!("IssuerAuthorized {name:?} -> {identity}")
        }
        RegistryEvent::IssuerRevoked { name, .. } => format!("IssuerRevoked {name:?}"),
        RegistryEvent::CredentialIssued { credential_key, .. } => {
            format!("CredentialIssued {credential_key}")
        }
        RegistryEvent::CredentialRevoked { credential_key, .. } => {
            format!("CredentialRevoked {credential_key}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{run_init, InitArgs};
    use credreg_core::Identity;

    const ADMIN: Identity = Identity::from_bytes([0xAA; 20]);

    fn setup(dir: &tempfile::TempDir) -> CliContext {
        let ctx = CliContext {
            ledger: dir.path().join("registry.json"),
            caller: Some(ADMIN),
        };
        run_init(&InitArgs { admin: ADMIN }, &ctx).unwrap();
        let file = LedgerFile::open(&ctx.ledger).unwrap();
        let outcome = file
            .ledger()
            .authorize_issuer(ADMIN, "Acme", Identity::from_bytes([0x11; 20]));
        file.commit(outcome).unwrap();
        ctx
    }

    #[test]
    fn list_with_and_without_filters() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = setup(&dir);
        for command in [
            AuditCommand::List {
                credential: None,
                issuer: None,
            },
            AuditCommand::List {
                credential: None,
                issuer: Some("Acme".into()),
            },
            AuditCommand::List {
                credential: Some(credreg_core::credential_key("cert-1")),
                issuer: None,
            },
        ] {
            assert_eq!(run_audit(&AuditArgs { command }, &ctx).unwrap(), 0);
        }
    }

    #[test]
    fn verify_intact_chain() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = setup(&dir);
        let args = AuditArgs {
            command: AuditCommand::Verify,
        };
        assert_eq!(run_audit(&args, &ctx).unwrap(), 0);
    }

    #[test]
    fn verify_reports_tampering() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = setup(&dir);

        let mut value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&ctx.ledger).unwrap()).unwrap();
        value["journal"][0]["event"]["name"] = serde_json::json!("Evil Corp");
        std::fs::write(&ctx.ledger, serde_json::to_vec(&value).unwrap()).unwrap();

        let args = AuditArgs {
            command: AuditCommand::Verify,
        };
        assert_eq!(run_audit(&args, &ctx).unwrap(), EXIT_BROKEN_CHAIN);
    }
}
