//! # Content Digests
//!
//! SHA-256 helpers and [`ContentDigest`], the self-describing digest used to
//! chain audit records. Structured values reach [`sha256_digest`] only
//! through [`CanonicalBytes`], so two parties serialising the same record
//! always agree on its digest.

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// Raw SHA-256 over arbitrary bytes.
///
/// Used for key derivation, where the input is a plain string rather than a
/// structured value.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    bytes
}

/// Compute a SHA-256 content digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest(sha256_bytes(data.as_bytes()))
}

fixed_hex_newtype!(
    /// A SHA-256 digest of canonical bytes.
    ///
    /// [`ContentDigest::ZERO`] is the genesis link of a digest chain.
    ContentDigest,
    32,
    "content digest"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_empty_object_vector() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "0x44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn key_order_does_not_change_digest() {
        let a = CanonicalBytes::new(&serde_json::json!({"a": 1, "b": 2})).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        let b = CanonicalBytes::new(&b).unwrap();
        assert_eq!(sha256_digest(&a), sha256_digest(&b));
    }

    #[test]
    fn different_inputs_different_digests() {
        let a = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"a": 2})).unwrap();
        assert_ne!(sha256_digest(&a), sha256_digest(&b));
    }
}
