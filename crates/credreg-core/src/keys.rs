//! # Hash-Derived Keys
//!
//! The registry indexes its two tables by 32-byte hashes rather than by the
//! raw strings they are derived from. Derivation is SHA-256 over the UTF-8
//! bytes of the input with no prefix, so any party (including a verifier
//! that never reads the issuer directory) can reproduce a key with a stock
//! SHA-256 tool:
//!
//! ```text
//! printf '%s' 'Acme University' | sha256sum
//! ```

use crate::digest::sha256_bytes;

fixed_hex_newtype!(
    /// Lookup key of the issuer directory: `SHA-256(issuer name)`.
    IssuerKey,
    32,
    "issuer key"
);

fixed_hex_newtype!(
    /// Caller-supplied content identifier of a credential record.
    ///
    /// Usually `SHA-256(credential document)`, but the registry treats it as
    /// opaque; only the zero value is rejected.
    CredentialKey,
    32,
    "credential key"
);

fixed_hex_newtype!(
    /// Opaque degree/category tag stored with a credential, usually
    /// `SHA-256(label)` such as `SHA-256("BACHELOR")`.
    CategoryTag,
    32,
    "category tag"
);

/// Derive the issuer-directory key for an issuer name.
pub fn issuer_key(name: &str) -> IssuerKey {
    IssuerKey(sha256_bytes(name.as_bytes()))
}

/// Derive a credential key from credential content.
pub fn credential_key(content: &str) -> CredentialKey {
    CredentialKey(sha256_bytes(content.as_bytes()))
}

/// Derive a category tag from a human-readable label.
pub fn category_tag(label: &str) -> CategoryTag {
    CategoryTag(sha256_bytes(label.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_key_known_vector() {
        // sha256("abc")
        assert_eq!(
            issuer_key("abc").to_hex(),
            "0xba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn derivations_are_pure_and_share_one_hash() {
        assert_eq!(issuer_key("Acme"), issuer_key("Acme"));
        assert_eq!(issuer_key("Acme").as_bytes(), credential_key("Acme").as_bytes());
        assert_eq!(issuer_key("Acme").as_bytes(), category_tag("Acme").as_bytes());
        assert_ne!(issuer_key("Acme"), issuer_key("acme"));
    }

    #[test]
    fn empty_input_is_not_zero() {
        // The zero sentinel is unreachable by derivation.
        assert!(!issuer_key("").is_zero());
        assert!(!credential_key("").is_zero());
    }

    #[test]
    fn parse_round_trips_through_display() {
        let k = credential_key("cert-1");
        let parsed: CredentialKey = k.to_string().parse().unwrap();
        assert_eq!(parsed, k);
    }

    #[test]
    fn keys_work_as_json_map_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(issuer_key("Acme"), 1u8);
        let json = serde_json::to_string(&map).unwrap();
        let back: std::collections::BTreeMap<IssuerKey, u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&issuer_key("Acme")), Some(&1));
    }
}
