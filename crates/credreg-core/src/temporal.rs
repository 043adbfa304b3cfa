//! # Ledger Time
//!
//! [`Timestamp`] is the "current time" value the execution context hands to
//! the registry: whole seconds since the Unix epoch, UTC. Zero is the null
//! sentinel reported for credentials that do not exist.
//!
//! Seconds (not a `DateTime`) are stored so that the value matches what a
//! ledger block header carries and serialises as a plain integer.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Whole seconds since the Unix epoch, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The null sentinel (1970-01-01T00:00:00Z).
    pub const ZERO: Self = Self(0);

    /// The current wall-clock time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Construct from seconds since the epoch.
    pub const fn from_unix_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Construct from a `chrono` UTC datetime. Pre-epoch instants clamp to zero.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(u64::try_from(dt.timestamp()).unwrap_or(0))
    }

    /// Seconds since the epoch.
    pub fn as_unix_secs(&self) -> u64 {
        self.0
    }

    /// Whether this is the null sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert to a `chrono` UTC datetime, if representable.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.0).ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }

    /// ISO 8601 with `Z` suffix, seconds precision.
    pub fn to_canonical_string(&self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            None => self.0.to_string(),
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}
