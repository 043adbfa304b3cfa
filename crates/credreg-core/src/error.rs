//! # Error Types
//!
//! Validation and canonicalization errors for the foundational types. All
//! errors use `thiserror`; nothing in this crate panics on bad input.

use thiserror::Error;

/// Validation errors for identifier and key newtypes.
///
/// Each variant carries the kind of value being parsed so that operators can
/// tell an identity typo from a credential-key typo without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input contains characters outside `[0-9a-fA-F]` (after an optional `0x`).
    #[error("invalid {kind}: \"{value}\" is not hexadecimal")]
    InvalidHex {
        /// What was being parsed (e.g. "identity", "credential key").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Input has the wrong number of hex digits.
    #[error("invalid {kind}: expected {expected} hex digits, got {actual}")]
    InvalidLength {
        /// What was being parsed.
        kind: &'static str,
        /// Required number of hex digits.
        expected: usize,
        /// Number of hex digits supplied.
        actual: usize,
    },
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
