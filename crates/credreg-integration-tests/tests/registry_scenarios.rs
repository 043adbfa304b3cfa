//! # Registry Scenarios
//!
//! End-to-end issuer and credential lifecycles driven through the ledger,
//! checking the query views, the verification tuple, and the audit trail
//! each step leaves behind.

use std::sync::Arc;

use credreg_core::{category_tag, credential_key, issuer_key, Identity, Timestamp};
use credreg_registry::{
    ErrorKind, Ledger, LedgerSnapshot, ManualClock, RegistryEvent, Role,
};

const ADMIN: Identity = Identity::from_bytes([0xAD; 20]);
const U1: Identity = Identity::from_bytes([0x01; 20]);
const U2: Identity = Identity::from_bytes([0x02; 20]);

const T0: u64 = 1_700_000_000;

fn ledger() -> (Ledger, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(T0)));
    let ledger = Ledger::with_clock(LedgerSnapshot::genesis(ADMIN).unwrap(), clock.clone());
    (ledger, clock)
}

/// Ledger with "Acme" bound to U1 and `cert-1` issued as a bachelor's degree.
fn acme_with_cert() -> (Ledger, Arc<ManualClock>) {
    let (ledger, clock) = ledger();
    ledger.authorize_issuer(ADMIN, "Acme", U1).unwrap();
    clock.advance(60);
    ledger
        .issue_credential(U1, credential_key("cert-1"), "Acme", category_tag("BACHELOR"))
        .unwrap();
    (ledger, clock)
}

#[test]
fn acme_credential_verifies_valid() {
    let (ledger, _) = acme_with_cert();
    let v = ledger.verify_credential(&credential_key("cert-1"), "Acme");

    assert!(v.is_valid);
    assert!(v.exists);
    assert!(!v.revoked);
    assert_eq!(v.issuer, U1);
    assert_eq!(v.issued_at, Timestamp::from_unix_secs(T0 + 60));
    assert_eq!(v.category, category_tag("BACHELOR"));
}

#[test]
fn outsider_cannot_issue_under_acme() {
    let (ledger, _) = acme_with_cert();
    let before = ledger.snapshot();

    let err = ledger
        .issue_credential(U2, credential_key("cert-2"), "Acme", category_tag("BACHELOR"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAuthorizedIssuer);

    assert_eq!(ledger.snapshot(), before);
    let view = ledger.read(|reg, _| reg.credential_record(&credential_key("cert-2")));
    assert!(!view.exists);
}

#[test]
fn issuer_revokes_own_credential() {
    let (ledger, clock) = acme_with_cert();
    clock.advance(60);
    ledger
        .revoke_credential(U1, credential_key("cert-1"), "Acme")
        .unwrap();

    let v = ledger.verify_credential(&credential_key("cert-1"), "Acme");
    assert!(!v.is_valid);
    assert!(v.exists);
    assert!(v.revoked);
    assert_eq!(v.issuer, U1);
    assert_eq!(v.issued_at, Timestamp::from_unix_secs(T0 + 60));
}

#[test]
fn revoking_twice_leaves_verification_unchanged() {
    let (ledger, _) = acme_with_cert();
    let key = credential_key("cert-1");

    ledger.revoke_credential(U1, key, "Acme").unwrap();
    let after_first = ledger.verify_credential(&key, "Acme");

    let err = ledger.revoke_credential(U1, key, "Acme").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyRevoked);
    assert_eq!(ledger.verify_credential(&key, "Acme"), after_first);
}

#[test]
fn revoking_issuer_keeps_prior_credentials() {
    let (ledger, _) = acme_with_cert();
    ledger.revoke_issuer(ADMIN, "Acme").unwrap();

    ledger.read(|reg, _| {
        assert!(!reg.is_issuer_authorized("Acme"));
        assert!(reg.issuer_address("Acme").is_zero());
        assert!(!reg.has_role(U1, Role::Issuer));

        let view = reg.credential_record(&credential_key("cert-1"));
        assert!(view.exists);
        assert_eq!(view.issuer, U1);
        assert_eq!(view.issuer_key, issuer_key("Acme"));
    });

    // The stored issuer key still matches, so verification remains valid.
    let v = ledger.verify_credential(&credential_key("cert-1"), "Acme");
    assert!(v.is_valid);

    // U1 can no longer issue under the name.
    let err = ledger
        .issue_credential(U1, credential_key("cert-9"), "Acme", category_tag("BACHELOR"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAuthorizedIssuer);
}

#[test]
fn revoked_issuer_identity_can_still_revoke_its_credential() {
    let (ledger, _) = acme_with_cert();
    ledger.revoke_issuer(ADMIN, "Acme").unwrap();
    ledger
        .revoke_credential(U1, credential_key("cert-1"), "Acme")
        .unwrap();
    assert!(ledger.verify_credential(&credential_key("cert-1"), "Acme").revoked);
}

#[test]
fn wrong_issuer_name_is_not_valid() {
    let (ledger, _) = acme_with_cert();
    let v = ledger.verify_credential(&credential_key("cert-1"), "Other");
    assert!(v.exists);
    assert!(!v.is_valid);
    assert!(!v.revoked);
}

#[test]
fn unissued_key_verifies_to_zero_tuple() {
    let (ledger, _) = ledger();
    let v = ledger.verify_credential(&credential_key("never"), "Acme");
    assert!(!v.is_valid);
    assert!(!v.exists);
    assert!(v.issuer.is_zero());
    assert!(v.issued_at.is_zero());
    assert!(!v.revoked);
    assert!(v.category.is_zero());
}

#[test]
fn reauthorization_after_revocation_binds_new_identity() {
    let (ledger, _) = acme_with_cert();
    ledger.revoke_issuer(ADMIN, "Acme").unwrap();
    ledger.authorize_issuer(ADMIN, "Acme", U2).unwrap();

    ledger
        .issue_credential(U2, credential_key("cert-2"), "Acme", category_tag("MASTER"))
        .unwrap();

    // The old credential stays attributed to U1; only U1 can revoke it.
    let err = ledger
        .revoke_credential(U2, credential_key("cert-1"), "Acme")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotIssuingParty);
    assert_eq!(
        ledger.read(|reg, _| reg.credential_record(&credential_key("cert-1")).issuer),
        U1
    );
}

#[test]
fn audit_trail_follows_the_lifecycle() {
    let (ledger, _) = acme_with_cert();
    ledger
        .revoke_credential(U1, credential_key("cert-1"), "Acme")
        .unwrap();
    ledger.revoke_issuer(ADMIN, "Acme").unwrap();

    ledger.read(|_, journal| {
        let names: Vec<_> = journal.records().iter().map(|r| r.event.name()).collect();
        assert_eq!(
            names,
            [
                "IssuerAuthorized",
                "CredentialIssued",
                "CredentialRevoked",
                "IssuerRevoked"
            ]
        );
        let callers: Vec<_> = journal.records().iter().map(|r| r.caller).collect();
        assert_eq!(callers, [ADMIN, U1, U1, ADMIN]);

        assert_eq!(journal.for_credential(&credential_key("cert-1")).len(), 2);
        assert_eq!(journal.for_issuer(&issuer_key("Acme")).len(), 4);

        match &journal.records()[1].event {
            RegistryEvent::CredentialIssued {
                credential_key: key,
                issuer_key: issuer,
                timestamp,
            } => {
                assert_eq!(*key, credential_key("cert-1"));
                assert_eq!(*issuer, issuer_key("Acme"));
                assert_eq!(*timestamp, Timestamp::from_unix_secs(T0 + 60));
            }
            other => panic!("unexpected event {other:?}"),
        }

        let integrity = journal.verify_chain();
        assert!(integrity.chain_valid);
        assert_eq!(integrity.total_records, 4);
        assert_eq!(integrity.head, journal.head());
    });
}

#[test]
fn rejections_leave_no_audit_record() {
    let (ledger, _) = acme_with_cert();
    let before = ledger.summary().journal_length;

    assert!(ledger.authorize_issuer(U1, "Evil", U2).is_err());
    assert!(ledger.authorize_issuer(ADMIN, "Acme", U2).is_err());
    assert!(ledger.revoke_issuer(ADMIN, "Nobody").is_err());
    assert!(ledger
        .issue_credential(U1, credential_key("cert-1"), "Acme", category_tag("X"))
        .is_err());
    assert!(ledger
        .revoke_credential(U2, credential_key("cert-1"), "Acme")
        .is_err());

    assert_eq!(ledger.summary().journal_length, before);
}
