//! # Canonical Serialization
//!
//! [`CanonicalBytes`] is the only construction path for bytes that feed an
//! audit digest. Two journals holding the same records must produce the
//! same digest chain regardless of field order or whitespace.
//!
//! ## Rules
//!
//! 1. Reject floats. Timestamps and sequence numbers are integers.
//! 2. Sort object keys lexicographically.
//! 3. Use compact separators (no whitespace).

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonical serialization.
///
/// The inner `Vec<u8>` is private; downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let checked = reject_floats(value)?;
        Ok(Self(serde_json::to_vec(&checked)?))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Number of canonical bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical form is empty (never true for valid JSON).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively reject float values and rebuild objects so that keys are
/// sorted. `serde_json::Map` is a `BTreeMap` without the `preserve_order`
/// feature, so reinsertion yields lexicographic order.
fn reject_floats(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Number(n) => {
            if n.is_f64() {
                return Err(CanonicalizationError::FloatRejected(
                    n.as_f64().unwrap_or(f64::NAN),
                ));
            }
            Ok(Value::Number(n))
        }
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            for (k, v) in map {
                sorted.insert(k, reject_floats(v)?);
            }
            Ok(Value::Object(sorted))
        }
        Value::Array(arr) => Ok(Value::Array(
            arr.into_iter()
                .map(reject_floats)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        other => Ok(other),
    }
}
