//! # Credential Subcommand
//!
//! Issue, revoke, verify, and show credentials. A credential is addressed
//! either by its content (hashed to the credential key) or by the key
//! itself.
//!
//! `credential verify` exits 0 when the credential is valid for the named
//! issuer and 2 otherwise, so scripts can branch on the result.

use anyhow::Result;
use clap::{Args, Subcommand};

use credreg_core::{credential_key, CredentialKey};
use credreg_registry::{CredentialView, Verification};

use crate::key::parse_category;
use crate::ledger_file::LedgerFile;
use crate::{print_record, CliContext};

/// Exit code of `credential verify` for anything but a valid credential.
pub const EXIT_NOT_VALID: u8 = 2;

/// Arguments for `credreg credential`.
#[derive(Args, Debug)]
pub struct CredentialArgs {
    #[command(subcommand)]
    pub command: CredentialCommand,
}

/// How the credential is named on the command line.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct CredentialRef {
    /// Credential content; hashed to the credential key.
    #[arg(long)]
    pub content: Option<String>,
    /// Credential key as hex.
    #[arg(long)]
    pub key: Option<CredentialKey>,
}

impl CredentialRef {
    /// Resolve to a credential key.
    pub fn resolve(&self) -> CredentialKey {
        match (&self.key, &self.content) {
            (Some(key), _) => *key,
            (None, Some(content)) => credential_key(content),
            (None, None) => CredentialKey::ZERO,
        }
    }
}

/// Credential subcommands.
#[derive(Subcommand, Debug)]
pub enum CredentialCommand {
    /// Issue a credential under an issuer name (authorized issuer acting).
    Issue {
        /// Issuer name the caller is bound to.
        #[arg(long)]
        issuer: String,
        #[command(flatten)]
        credential: CredentialRef,
        /// Category label, or a 32-byte category tag as hex.
        #[arg(long)]
        category: String,
    },
    /// Revoke a credential (original issuing identity acting).
    Revoke {
        /// Issuer name the credential was issued under.
        #[arg(long)]
        issuer: String,
        #[command(flatten)]
        credential: CredentialRef,
    },
    /// Verify a credential against the issuer it claims.
    Verify {
        /// Claimed issuer name.
        #[arg(long)]
        issuer: String,
        #[command(flatten)]
        credential: CredentialRef,
    },
    /// Show the stored record of a credential.
    Show {
        #[command(flatten)]
        credential: CredentialRef,
    },
}

/// Execute the credential subcommand.
pub fn run_credential(args: &CredentialArgs, ctx: &CliContext) -> Result<u8> {
    match &args.command {
        CredentialCommand::Issue {
            issuer,
            credential,
            category,
        } => cmd_issue(ctx, issuer, credential.resolve(), category),
        CredentialCommand::Revoke { issuer, credential } => {
            cmd_revoke(ctx, issuer, credential.resolve())
        }
        CredentialCommand::Verify { issuer, credential } => {
            cmd_verify(ctx, issuer, credential.resolve())
        }
        CredentialCommand::Show { credential } => cmd_show(ctx, credential.resolve()),
    }
}

fn cmd_issue(ctx: &CliContext, issuer: &str, key: CredentialKey, category: &str) -> Result<u8> {
    let caller = ctx.caller()?;
    let category = parse_category(category);
    let file = LedgerFile::open(&ctx.ledger)?;
    let record = file.commit(
        file.ledger()
            .issue_credential(caller, key, issuer, category),
    )?;

    println!("OK: issued credential {key}");
    println!("  Issuer:   {issuer}");
    println!("  Category: {category}");
    print_record(&record);
    Ok(0)
}

fn cmd_revoke(ctx: &CliContext, issuer: &str, key: CredentialKey) -> Result<u8> {
    let caller = ctx.caller()?;
    let file = LedgerFile::open(&ctx.ledger)?;
    let record = file.commit(file.ledger().revoke_credential(caller, key, issuer))?;

    println!("OK: revoked credential {key}");
    print_record(&record);
    Ok(0)
}

fn cmd_verify(ctx: &CliContext, issuer: &str, key: CredentialKey) -> Result<u8> {
    let file = LedgerFile::open(&ctx.ledger)?;
    let verification = file.ledger().verify_credential(&key, issuer);

    if verification.is_valid {
        println!("OK: credential {key} is valid for {issuer:?}");
    } else if !verification.exists {
        println!("FAIL: credential {key} was never issued");
    } else if verification.revoked {
        println!("FAIL: credential {key} has been revoked");
    } else {
        println!("FAIL: credential {key} was not issued by {issuer:?}");
    }
    print_verification(&verification);

    Ok(if verification.is_valid {
        0
    } else {
        EXIT_NOT_VALID
    })
}

fn cmd_show(ctx: &CliContext, key: CredentialKey) -> Result<u8> {
    let file = LedgerFile::open(&ctx.ledger)?;
    let view = file.ledger().read(|registry, _| registry.credential_record(&key));

    println!("Credential: {key}");
    print_view(&view);
    Ok(0)
}

fn print_verification(verification: &Verification) {
    if !verification.exists {
        return;
    }
    println!("  Issuer:   {}", verification.issuer);
    println!("  Issued:   {}", verification.issued_at);
    println!("  Category: {}", verification.category);
    println!("  Revoked:  {}", verification.revoked);
}

fn print_view(view: &CredentialView) {
    if !view.exists {
        println!("  Status: not found");
        return;
    }
    let status = if view.revoked { "revoked" } else { "active" };
    println!("  Status:     {status}");
    println!("  Issuer:     {}", view.issuer);
    println!("  Issuer key: {}", view.issuer_key);
    println!("  Issued:     {}", view.issued_at);
    println!("  Category:   {}", view.category);
}
