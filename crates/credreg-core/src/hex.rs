//! Hex codec shared by every fixed-width identifier, and the macro that
//! stamps out those identifier newtypes.

use crate::error::ValidationError;

/// Lowercase hex without prefix, for raw key material that has no
/// identifier newtype. Re-exported as `encode_hex`.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode exactly `N` bytes of hex, accepting an optional `0x`/`0X` prefix.
pub(crate) fn decode_fixed<const N: usize>(
    kind: &'static str,
    value: &str,
) -> Result<[u8; N], ValidationError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidHex {
            kind,
            value: value.to_string(),
        });
    }
    if digits.len() != N * 2 {
        return Err(ValidationError::InvalidLength {
            kind,
            expected: N * 2,
            actual: digits.len(),
        });
    }

    let mut out = [0u8; N];
    for (i, chunk) in digits.as_bytes().chunks(2).enumerate() {
        out[i] = (nibble(chunk[0]) << 4) | nibble(chunk[1]);
    }
    Ok(out)
}

// Input is pre-checked with `is_ascii_hexdigit`.
fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}

/// Define a `Copy` newtype over `[u8; N]` with a zero sentinel, hex
/// `Display`/`FromStr`, and serde as a `0x`-prefixed hex string.
macro_rules! fixed_hex_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            /// The all-zero null sentinel.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Width in bytes.
            pub const LEN: usize = $len;

            /// Wrap raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Access the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Whether this is the all-zero sentinel.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Parse from hex, with or without a `0x` prefix.
            pub fn parse(value: &str) -> Result<Self, $crate::error::ValidationError> {
                $crate::hex::decode_fixed::<$len>($kind, value.trim()).map(Self)
            }

            /// Render as `0x`-prefixed lowercase hex.
            pub fn to_hex(&self) -> String {
                format!("0x{}", $crate::hex::encode(&self.0))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_prefix_and_mixed_case() {
        let a: [u8; 2] = decode_fixed("t", "0xABcd").unwrap();
        let b: [u8; 2] = decode_fixed("t", "abcd").unwrap();
        assert_eq!(a, [0xab, 0xcd]);
        assert_eq!(a, b);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let err = decode_fixed::<2>("t", "0xabc").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidLength { expected: 4, actual: 3, .. }
        ));
    }

    #[test]
    fn decode_rejects_non_hex_without_panicking_on_multibyte() {
        assert!(matches!(
            decode_fixed::<2>("t", "zzzz"),
            Err(ValidationError::InvalidHex { .. })
        ));
        assert!(matches!(
            decode_fixed::<2>("t", "éé"),
            Err(ValidationError::InvalidHex { .. })
        ));
    }

    #[test]
    fn encode_is_lowercase() {
        assert_eq!(encode(&[0xAB, 0x01]), "ab01");
    }
}
