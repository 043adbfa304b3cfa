//! # Seed Subcommand
//!
//! Populates a registry with three sample issuers, each with a freshly
//! generated identity, and one credential per issuer. The administrator
//! authorizes the issuers; each issuer then issues its own credential.

use anyhow::Result;

use credreg_core::{category_tag, credential_key};

use crate::identity::{generate, GeneratedIdentity};
use crate::ledger_file::LedgerFile;
use crate::CliContext;

/// Sample issuers with one credential each: (issuer, content, category).
pub const SAMPLES: [(&str, &str, &str); 3] = [
    (
        "Harvard University",
        "John Doe - Bachelor of Computer Science - Harvard University - 2024",
        "BACHELOR_CS",
    ),
    (
        "MIT",
        "Jane Smith - Master of Business Administration - MIT - 2024",
        "MASTER_MBA",
    ),
    (
        "Stanford University",
        "Bob Johnson - Doctor of Philosophy - Stanford University - 2024",
        "DOCTORATE_PHD",
    ),
];

/// Execute the seed subcommand.
pub fn run_seed(ctx: &CliContext) -> Result<u8> {
    let admin = ctx.caller()?;
    let file = LedgerFile::open(&ctx.ledger)?;

    println!("Seeding {}", ctx.ledger.display());
    for (name, content, category) in SAMPLES {
        let GeneratedIdentity {
            identity,
            secret_hex,
            ..
        } = generate();

        file.commit(file.ledger().authorize_issuer(admin, name, identity))?;
        let key = credential_key(content);
        file.commit(
            file.ledger()
                .issue_credential(identity, key, name, category_tag(category)),
        )?;

        println!("  Issuer: {name}");
        println!("    Identity:   {identity}");
        println!("    Secret key: {secret_hex}");
        println!("    Credential: {key} ({category})");
        println!("    Content:    {content}");
    }

    println!("OK: seeded {} issuers and {} credentials", SAMPLES.len(), SAMPLES.len());
    Ok(0)
}
