//! # credreg CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use credreg_cli::audit::{run_audit, AuditArgs};
use credreg_cli::credential::{run_credential, CredentialArgs};
use credreg_cli::identity::{run_identity, IdentityArgs};
use credreg_cli::issuer::{run_issuer, IssuerArgs};
use credreg_cli::key::{run_key, KeyArgs};
use credreg_cli::registry::{run_info, run_init, InitArgs};
use credreg_cli::seed::run_seed;
use credreg_cli::CliContext;
use credreg_core::Identity;

/// Credential registry operator tool.
///
/// Works on a local registry file. Mutating commands act as the identity
/// given with `--as`.
#[derive(Parser, Debug)]
#[command(name = "credreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Registry file to operate on.
    #[arg(long, global = true, default_value = "registry.json")]
    ledger: PathBuf,

    /// Identity the command acts as.
    #[arg(long = "as", global = true, value_name = "IDENTITY")]
    acting_as: Option<Identity>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new registry file with the given administrator.
    Init(InitArgs),

    /// Show administrator, role tags, counts, and the journal head.
    Info,

    /// Derive issuer keys, credential keys, and category tags.
    Key(KeyArgs),

    /// Ed25519 keypair and identity generation.
    Identity(IdentityArgs),

    /// Authorize, revoke, and inspect issuers.
    Issuer(IssuerArgs),

    /// Issue, revoke, verify, and show credentials.
    Credential(CredentialArgs),

    /// Inspect and verify the audit journal.
    Audit(AuditArgs),

    /// Populate a registry with sample issuers and credentials.
    Seed,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let ctx = CliContext {
        ledger: cli.ledger,
        caller: cli.acting_as,
    };
    tracing::debug!(ledger = %ctx.ledger.display(), "credreg starting");

    let result = match cli.command {
        Commands::Init(args) => run_init(&args, &ctx),
        Commands::Info => run_info(&ctx),
        Commands::Key(args) => run_key(&args),
        Commands::Identity(args) => run_identity(&args),
        Commands::Issuer(args) => run_issuer(&args, &ctx),
        Commands::Credential(args) => run_credential(&args, &ctx),
        Commands::Audit(args) => run_audit(&args, &ctx),
        Commands::Seed => run_seed(&ctx),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
