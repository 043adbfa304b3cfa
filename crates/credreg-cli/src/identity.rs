//! # Identity Subcommand
//!
//! Generates an Ed25519 keypair and derives the registry identity from its
//! public key (last 20 bytes of SHA-256).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use credreg_core::{encode_hex, Identity};

/// Arguments for `credreg identity`.
#[derive(Args, Debug)]
pub struct IdentityArgs {
    #[command(subcommand)]
    pub command: IdentityCommand,
}

/// Identity subcommands.
#[derive(Subcommand, Debug)]
pub enum IdentityCommand {
    /// Generate a new Ed25519 keypair and print its identity.
    Generate {
        /// Output directory for the keypair files.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
        /// Prefix for the key filenames.
        #[arg(long, default_value = "credreg")]
        prefix: String,
    },
}

/// A freshly generated keypair.
pub struct GeneratedIdentity {
    /// Registry identity derived from the public key.
    pub identity: Identity,
    /// Hex-encoded 32-byte secret key.
    pub secret_hex: String,
    /// Hex-encoded 32-byte public key.
    pub public_hex: String,
}

/// Execute the identity subcommand.
pub fn run_identity(args: &IdentityArgs) -> Result<u8> {
    match &args.command {
        IdentityCommand::Generate { output, prefix } => cmd_generate(output, prefix),
    }
}

/// Generate a keypair in memory.
pub fn generate() -> GeneratedIdentity {
    let sk = SigningKey::generate(&mut OsRng);
    let vk = sk.verifying_key();
    GeneratedIdentity {
        identity: Identity::from_public_key(vk.as_bytes()),
        secret_hex: encode_hex(&sk.to_bytes()),
        public_hex: encode_hex(vk.as_bytes()),
    }
}

fn cmd_generate(output_dir: &Path, prefix: &str) -> Result<u8> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let generated = generate();
    let sk_path = output_dir.join(format!("{prefix}.key"));
    let vk_path = output_dir.join(format!("{prefix}.pub"));

    std::fs::write(&sk_path, &generated.secret_hex)
        .with_context(|| format!("failed to write private key: {}", sk_path.display()))?;
    std::fs::write(&vk_path, &generated.public_hex)
        .with_context(|| format!("failed to write public key: {}", vk_path.display()))?;

    println!("OK: generated Ed25519 keypair");
    println!("  Private key: {}", sk_path.display());
    println!("  Public key:  {}", vk_path.display());
    println!("  Identity:    {}", generated.identity);

    Ok(0)
}
