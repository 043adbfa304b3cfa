//! # Caller Identity
//!
//! [`Identity`] is the opaque, fixed-width (20-byte) identifier of a caller.
//! The registry never creates identities; they arrive with each invocation
//! from the execution context. The all-zero identity is the null sentinel
//! returned by lookups that find nothing.

use sha2::{Digest, Sha256};

fixed_hex_newtype!(
    /// A 20-byte caller identity, rendered as `0x`-prefixed hex.
    ///
    /// Typically derived from a public key with [`Identity::from_public_key`].
    Identity,
    20,
    "identity"
);

impl Identity {
    /// Derive an identity from a 32-byte Ed25519 public key.
    ///
    /// Takes the trailing 20 bytes of `SHA-256(public_key)`.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let hash = Sha256::digest(public_key);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_null_sentinel() {
        assert!(Identity::ZERO.is_zero());
        assert_eq!(Identity::default(), Identity::ZERO);
        assert_eq!(
            Identity::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn parse_display_agree() {
        let raw = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
        let id: Identity = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert!(!id.is_zero());
    }

    #[test]
    fn parse_rejects_address_of_wrong_width() {
        assert!(Identity::parse("0x1234").is_err());
        assert!(Identity::parse(&format!("0x{}", "ab".repeat(32))).is_err());
    }

    #[test]
    fn from_public_key_is_deterministic_and_distinct() {
        let a = Identity::from_public_key(&[1u8; 32]);
        let b = Identity::from_public_key(&[1u8; 32]);
        let c = Identity::from_public_key(&[2u8; 32]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_zero());
    }

    #[test]
    fn serde_uses_hex_string() {
        let id = Identity::from_bytes([0xAA; 20]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "aa".repeat(20)));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn debug_names_the_type() {
        let s = format!("{:?}", Identity::ZERO);
        assert!(s.starts_with("Identity(0x"));
    }
}
