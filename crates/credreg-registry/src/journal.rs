//! # Audit Journal: Immutable Hash Chain
//!
//! Every committed mutation appends one [`AuditRecord`] whose digest chains
//! to the previous record's digest. The first record chains from
//! [`ContentDigest::ZERO`]. The digest covers every other field of the
//! record through [`CanonicalBytes`], so any edit to a stored record or any
//! reordering of records is detected by [`AuditJournal::verify_chain`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use credreg_core::{
    sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, CredentialKey, Identity,
    IssuerKey, Timestamp,
};

use crate::events::RegistryEvent;

/// One sealed journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// 1-based position in the journal.
    pub sequence: u64,
    /// Unique record identifier.
    pub id: Uuid,
    /// Ledger time of the commit.
    pub recorded_at: Timestamp,
    /// Identity that invoked the mutation.
    pub caller: Identity,
    /// The emitted event.
    pub event: RegistryEvent,
    /// Digest of the preceding record, or zero for the first.
    pub previous_digest: ContentDigest,
    /// Digest of this record's other fields.
    pub digest: ContentDigest,
}

// Everything except `digest`, borrowed for hashing.
#[derive(Serialize)]
struct SealedFields<'a> {
    sequence: u64,
    id: &'a Uuid,
    recorded_at: Timestamp,
    caller: &'a Identity,
    event: &'a RegistryEvent,
    previous_digest: &'a ContentDigest,
}

impl AuditRecord {
    /// Build and seal a record.
    pub fn seal(
        sequence: u64,
        recorded_at: Timestamp,
        caller: Identity,
        event: RegistryEvent,
        previous_digest: ContentDigest,
    ) -> Result<Self, CanonicalizationError> {
        let id = Uuid::new_v4();
        let digest = compute_digest(sequence, &id, recorded_at, &caller, &event, &previous_digest)?;
        Ok(Self {
            sequence,
            id,
            recorded_at,
            caller,
            event,
            previous_digest,
            digest,
        })
    }

    /// Recompute the digest from the stored fields.
    pub fn recompute_digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        compute_digest(
            self.sequence,
            &self.id,
            self.recorded_at,
            &self.caller,
            &self.event,
            &self.previous_digest,
        )
    }
}

fn compute_digest(
    sequence: u64,
    id: &Uuid,
    recorded_at: Timestamp,
    caller: &Identity,
    event: &RegistryEvent,
    previous_digest: &ContentDigest,
) -> Result<ContentDigest, CanonicalizationError> {
    let canonical = CanonicalBytes::new(&SealedFields {
        sequence,
        id,
        recorded_at,
        caller,
        event,
        previous_digest,
    })?;
    Ok(sha256_digest(&canonical))
}

/// Result of chain integrity verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIntegrity {
    /// Records examined.
    pub total_records: usize,
    /// Records whose sequence, link or own digest does not check out.
    pub broken_links: usize,
    /// `broken_links == 0`.
    pub chain_valid: bool,
    /// Digest of the last record, zero for an empty journal.
    pub head: ContentDigest,
}

/// One page of a journal scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalPage<'a> {
    /// Matching records in commit order.
    pub records: Vec<&'a AuditRecord>,
    /// Cursor for the next page; `None` when no further record matches.
    pub next_after: Option<u64>,
}

/// Append-only sequence of audit records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditJournal {
    records: Vec<AuditRecord>,
}

impl AuditJournal {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seal the record that would follow the current head, without appending it.
    pub fn prepare(
        &self,
        recorded_at: Timestamp,
        caller: Identity,
        event: RegistryEvent,
    ) -> Result<AuditRecord, CanonicalizationError> {
        AuditRecord::seal(self.next_sequence(), recorded_at, caller, event, self.head())
    }

    /// Append a record produced by [`AuditJournal::prepare`] against the current head.
    pub(crate) fn push(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    /// Digest of the last record, or zero when empty.
    pub fn head(&self) -> ContentDigest {
        self.records
            .last()
            .map(|r| r.digest)
            .unwrap_or(ContentDigest::ZERO)
    }

    /// Sequence number the next record will carry.
    pub fn next_sequence(&self) -> u64 {
        self.records.len() as u64 + 1
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in commit order.
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Up to `limit` records with sequence greater than `after` that satisfy
    /// `filter`, in commit order.
    pub fn page(
        &self,
        after: u64,
        limit: usize,
        filter: impl Fn(&AuditRecord) -> bool,
    ) -> JournalPage<'_> {
        let start = usize::try_from(after)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        let mut matching = self.records[start..].iter().filter(|&r| filter(r));
        let records: Vec<&AuditRecord> = matching.by_ref().take(limit).collect();
        let next_after = match (records.last(), matching.next()) {
            (Some(last), Some(_)) => Some(last.sequence),
            _ => None,
        };
        JournalPage {
            records,
            next_after,
        }
    }

    /// Records whose event concerns `key`.
    pub fn for_credential(&self, key: &CredentialKey) -> Vec<&AuditRecord> {
        self.records
            .iter()
            .filter(|r| r.event.credential_key().as_ref() == Some(key))
            .collect()
    }

    /// Records whose event concerns issuer `key`, including credential
    /// events issued under it.
    pub fn for_issuer(&self, key: &IssuerKey) -> Vec<&AuditRecord> {
        self.records
            .iter()
            .filter(|r| r.event.issuer_key() == *key)
            .collect()
    }

    /// Verify sequence numbering, digest linkage and each record's own digest.
    pub fn verify_chain(&self) -> ChainIntegrity {
        let mut broken_links = 0;
        let mut expected_previous = ContentDigest::ZERO;

        for (index, record) in self.records.iter().enumerate() {
            let intact = record.sequence == index as u64 + 1
                && record.previous_digest == expected_previous
                && matches!(record.recompute_digest(), Ok(d) if d == record.digest);
            if !intact {
                broken_links += 1;
            }
            expected_previous = record.digest;
        }

        ChainIntegrity {
            total_records: self.records.len(),
            broken_links,
            chain_valid: broken_links == 0,
            head: self.head(),
        }
    }
}
