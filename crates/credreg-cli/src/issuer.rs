//! # Issuer Subcommand
//!
//! Issuer authorization and revocation (administrator acting) and the
//! per-name status report.

use anyhow::Result;
use clap::{Args, Subcommand};

use credreg_core::Identity;

use crate::ledger_file::LedgerFile;
use crate::{print_record, CliContext};

/// Arguments for `credreg issuer`.
#[derive(Args, Debug)]
pub struct IssuerArgs {
    #[command(subcommand)]
    pub command: IssuerCommand,
}

/// Issuer subcommands.
#[derive(Subcommand, Debug)]
pub enum IssuerCommand {
    /// Bind an issuer name to an identity and grant it the Issuer role.
    Authorize {
        /// Issuer name.
        name: String,
        /// Identity to bind.
        identity: Identity,
    },
    /// Clear an issuer binding and retract its Issuer role.
    Revoke {
        /// Issuer name.
        name: String,
    },
    /// Print the authorization status of one or more issuers.
    Status {
        /// Issuer names.
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Execute the issuer subcommand.
pub fn run_issuer(args: &IssuerArgs, ctx: &CliContext) -> Result<u8> {
    match &args.command {
        IssuerCommand::Authorize { name, identity } => cmd_authorize(ctx, name, *identity),
        IssuerCommand::Revoke { name } => cmd_revoke(ctx, name),
        IssuerCommand::Status { names } => cmd_status(ctx, names),
    }
}

fn cmd_authorize(ctx: &CliContext, name: &str, identity: Identity) -> Result<u8> {
    let caller = ctx.caller()?;
    let file = LedgerFile::open(&ctx.ledger)?;
    let record = file.commit(file.ledger().authorize_issuer(caller, name, identity))?;

    println!("OK: authorized issuer {name:?}");
    println!("  Identity: {identity}");
    println!("  Key:      {}", record.event.issuer_key());
    print_record(&record);
    Ok(0)
}

fn cmd_revoke(ctx: &CliContext, name: &str) -> Result<u8> {
    let caller = ctx.caller()?;
    let file = LedgerFile::open(&ctx.ledger)?;
    let record = file.commit(file.ledger().revoke_issuer(caller, name))?;

    println!("OK: revoked issuer {name:?}");
    print_record(&record);
    Ok(0)
}

fn cmd_status(ctx: &CliContext, names: &[String]) -> Result<u8> {
    let file = LedgerFile::open(&ctx.ledger)?;
    file.ledger().read(|registry, _| {
        println!("Issuers ({}):", names.len());
        for name in names {
            let status = registry.issuer_status(name);
            if status.authorized {
                println!("  {name}: authorized ({})", status.identity);
            } else {
                println!("  {name}: not authorized");
            }
        }
    });
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{run_init, InitArgs};

    const ADMIN: Identity = Identity::from_bytes([0xAA; 20]);
    const ACME: Identity = Identity::from_bytes([0x11; 20]);

    fn setup(dir: &tempfile::TempDir) -> CliContext {
        let ctx = CliContext {
            ledger: dir.path().join("registry.json"),
            caller: Some(ADMIN),
        };
        run_init(&InitArgs { admin: ADMIN }, &ctx).unwrap();
        ctx
    }

    fn authorize(name: &str, identity: Identity) -> IssuerArgs {
        IssuerArgs {
            command: IssuerCommand::Authorize {
                name: name.into(),
                identity,
            },
        }
    }

    #[test]
    fn authorize_and_revoke() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = setup(&dir);

        assert_eq!(run_issuer(&authorize("Acme", ACME), &ctx).unwrap(), 0);
        let file = LedgerFile::open(&ctx.ledger).unwrap();
        assert_eq!(file.ledger().read(|reg, _| reg.issuer_address("Acme")), ACME);

        let revoke = IssuerArgs {
            command: IssuerCommand::Revoke {
                name: "Acme".into(),
            },
        };
        assert_eq!(run_issuer(&revoke, &ctx).unwrap(), 0);
        let file = LedgerFile::open(&ctx.ledger).unwrap();
        assert!(!file.ledger().read(|reg, _| reg.is_issuer_authorized("Acme")));
        assert_eq!(file.ledger().summary().journal_length, 2);
    }

    #[test]
    fn authorize_requires_acting_identity() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = setup(&dir);
        ctx.caller = None;
        let err = run_issuer(&authorize("Acme", ACME), &ctx).unwrap_err();
        assert!(err.to_string().contains("--as"));
    }

    #[test]
    fn non_admin_is_rejected_and_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = setup(&dir);
        ctx.caller = Some(ACME);
        let before = std::fs::read(&ctx.ledger).unwrap();

        let err = run_issuer(&authorize("Acme", ACME), &ctx).unwrap_err();
        assert!(err.to_string().contains("UNAUTHORIZED"));
        assert_eq!(std::fs::read(&ctx.ledger).unwrap(), before);
    }

    #[test]
    fn status_reports_any_name() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = setup(&dir);
        run_issuer(&authorize("Acme", ACME), &ctx).unwrap();

        let status = IssuerArgs {
            command: IssuerCommand::Status {
                names: vec!["Acme".into(), "Unknown".into()],
            },
        };
        assert_eq!(run_issuer(&status, &ctx).unwrap(), 0);
    }
}
