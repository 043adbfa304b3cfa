#![deny(missing_docs)]

//! # credreg-core: Foundational Types for the Credential Registry
//!
//! This crate defines the primitives every other crate in the workspace
//! depends on. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for every key space.** [`Identity`], [`IssuerKey`],
//!    [`CredentialKey`] and [`CategoryTag`] are distinct types. A credential
//!    key cannot be passed where an issuer key is expected.
//!
//! 2. **Keys are pure functions of public input.** [`issuer_key`],
//!    [`credential_key`] and [`category_tag`] are SHA-256 over UTF-8 bytes.
//!    A verifier never needs a directory read to derive the key it queries.
//!
//! 3. **Zero is the null sentinel.** Every fixed-width type has a `ZERO`
//!    constant that read operations return for "absent" instead of failing.
//!
//! 4. **[`CanonicalBytes`] is the sole path to audit digests.** Journal
//!    digests flow through `CanonicalBytes::new()` and [`sha256_digest`].

#[macro_use]
mod hex;

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod keys;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_bytes, sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use hex::encode as encode_hex;
pub use identity::Identity;
pub use keys::{category_tag, credential_key, issuer_key, CategoryTag, CredentialKey, IssuerKey};
pub use temporal::Timestamp;
