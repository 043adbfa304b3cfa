//! # Registry File Subcommands
//!
//! `credreg init` creates a registry file with a designated administrator;
//! `credreg info` prints the registry overview.

use anyhow::Result;
use clap::Args;

use credreg_core::Identity;
use credreg_registry::LedgerSnapshot;

use crate::ledger_file::LedgerFile;
use crate::CliContext;

/// Arguments for `credreg init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Identity that holds the Administrator role.
    #[arg(long)]
    pub admin: Identity,
}

/// Create a new registry file. Refuses to overwrite an existing one.
pub fn run_init(args: &InitArgs, ctx: &CliContext) -> Result<u8> {
    let snapshot = LedgerSnapshot::genesis(args.admin)?;
    LedgerFile::create(&ctx.ledger, snapshot)?;

    println!("OK: created registry {}", ctx.ledger.display());
    println!("  Administrator: {}", args.admin);
    Ok(0)
}

/// Print the registry overview.
pub fn run_info(ctx: &CliContext) -> Result<u8> {
    let file = LedgerFile::open(&ctx.ledger)?;
    let summary = file.ledger().summary();

    println!("Registry: {}", ctx.ledger.display());
    println!("  Administrator:       {}", summary.administrator);
    println!("  Administrator role:  {}", summary.administrator_role);
    println!("  Issuer role:         {}", summary.issuer_role);
    println!(
        "  Issuers:             {} authorized, {} known",
        summary.issuers_authorized, summary.issuers_known
    );
    println!(
        "  Credentials:         {} issued, {} revoked",
        summary.credentials_issued, summary.credentials_revoked
    );
    println!("  Journal:             {} records", summary.journal_length);
    println!("  Journal head:        {}", summary.head_digest);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir: &tempfile::TempDir) -> CliContext {
        CliContext {
            ledger: dir.path().join("registry.json"),
            caller: None,
        }
    }

    #[test]
    fn init_creates_file_and_info_reads_it() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let args = InitArgs {
            admin: Identity::from_bytes([0xAA; 20]),
        };
        assert_eq!(run_init(&args, &ctx).unwrap(), 0);
        assert!(ctx.ledger.exists());
        assert_eq!(run_info(&ctx).unwrap(), 0);
    }

    #[test]
    fn init_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let args = InitArgs {
            admin: Identity::from_bytes([0xAA; 20]),
        };
        run_init(&args, &ctx).unwrap();
        assert!(run_init(&args, &ctx).is_err());
    }

    #[test]
    fn init_rejects_zero_administrator() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let args = InitArgs {
            admin: Identity::ZERO,
        };
        assert!(run_init(&args, &ctx).is_err());
        assert!(!ctx.ledger.exists());
    }

    #[test]
    fn info_without_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_info(&context(&dir)).is_err());
    }
}
