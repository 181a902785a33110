//! Property-based tests for credential engine invariants
//!
//! These tests verify the critical invariants:
//! - Signature soundness: round-trips verify, any single-bit tamper fails
//! - Single use: at most one registered→attended transition ever wins
//! - Capacity: N concurrent reservations never exceed K slots

use capacity_engine::{CapacityCoordinator, EventSnapshot, InMemoryEventDirectory};
use checkin_engine::{CredentialIssuer, CredentialValidator, Error, InMemoryUserDirectory, Metrics};
use chrono::{Duration, Utc};
use credential_core::{
    CredentialClaims, CredentialCodec, EventId, RegistrationId, SecretKey, StudentId,
};
use proptest::prelude::*;
use registration_store::{RegistrationStore, ScanLedger, ScanOutcome};
use std::sync::Arc;

fn codec() -> CredentialCodec {
    CredentialCodec::new(SecretKey::from_bytes(b"property-test-key").unwrap())
}

/// Strategy for opaque identifier strings
fn id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9-]{4,24}"
}

/// Strategy for credential claims
fn claims_strategy() -> impl Strategy<Value = CredentialClaims> {
    (id_strategy(), id_strategy(), id_strategy(), 0i64..86_400).prop_map(
        |(reg, student, event, expiry_secs)| CredentialClaims {
            registration_id: RegistrationId::new(reg),
            student_id: StudentId::new(student),
            event_id: EventId::new(event),
            issued_at: Utc::now(),
            expires_at: Some(Utc::now() + Duration::seconds(expiry_secs)),
            event_title: Some("Prop Event".to_string()),
            student_name: None,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: sign → encode → decode → verify holds for all claims
    #[test]
    fn prop_roundtrip_verifies(claims in claims_strategy()) {
        let codec = codec();
        let credential = codec.sign(claims);
        let wire = codec.encode(&credential).unwrap();
        let decoded = CredentialCodec::decode(&wire).unwrap();

        prop_assert_eq!(&decoded, &credential);
        prop_assert!(codec.verify(&decoded));
    }

    /// Property: flipping any single bit of the digest breaks verification
    #[test]
    fn prop_single_bit_flip_fails(
        claims in claims_strategy(),
        byte in 0usize..32,
        bit in 0u8..8,
    ) {
        let codec = codec();
        let mut credential = codec.sign(claims);

        let mut digest = hex::decode(&credential.signature).unwrap();
        digest[byte] ^= 1 << bit;
        credential.signature = hex::encode(digest);

        prop_assert!(!codec.verify(&credential));
    }

    /// Property: mutating any canonical field invalidates the signature
    #[test]
    fn prop_canonical_field_tamper_fails(claims in claims_strategy(), suffix in "[a-z]{1,4}") {
        let codec = codec();
        let signed = codec.sign(claims);

        let mut tampered = signed.clone();
        tampered.claims.registration_id =
            RegistrationId::new(format!("{}{}", signed.claims.registration_id, suffix));
        prop_assert!(!codec.verify(&tampered));

        let mut tampered = signed.clone();
        tampered.claims.student_id =
            StudentId::new(format!("{}{}", signed.claims.student_id, suffix));
        prop_assert!(!codec.verify(&tampered));

        let mut tampered = signed.clone();
        tampered.claims.event_id =
            EventId::new(format!("{}{}", signed.claims.event_id, suffix));
        prop_assert!(!codec.verify(&tampered));

        let mut tampered = signed;
        tampered.claims.issued_at += Duration::seconds(1);
        prop_assert!(!codec.verify(&tampered));
    }
}

fn engine(
    capacity: u32,
) -> (
    CredentialIssuer,
    Arc<CredentialValidator>,
    Arc<InMemoryEventDirectory>,
    EventId,
) {
    let codec = Arc::new(codec());
    let events = Arc::new(InMemoryEventDirectory::new());
    let event_id = EventId::new("evt-prop");
    events.add_event(
        EventSnapshot {
            event_id: event_id.clone(),
            title: "Prop Event".to_string(),
            max_participants: capacity,
            registration_deadline: Utc::now() + Duration::hours(1),
            ends_at: Utc::now() + Duration::hours(4),
        },
        0,
    );
    let store = Arc::new(RegistrationStore::new(Arc::new(ScanLedger::new())));
    let metrics = Arc::new(Metrics::new().unwrap());

    let issuer = CredentialIssuer::new(
        CapacityCoordinator::new(events.clone()),
        events.clone(),
        Arc::new(InMemoryUserDirectory::new()),
        store.clone(),
        codec.clone(),
        metrics.clone(),
    );
    let validator = Arc::new(CredentialValidator::new(store, codec, metrics));
    (issuer, validator, events, event_id)
}

/// N concurrent scans of one credential: exactly one valid, the rest
/// duplicates, and the audit log holds one entry per attempt.
#[test]
fn concurrent_validations_have_exactly_one_winner() {
    const SCANNERS: usize = 24;

    let rt = tokio::runtime::Runtime::new().unwrap();
    let (issuer, validator, _, event_id) = engine(10);

    let credential = rt
        .block_on(issuer.issue(&StudentId::new("s1"), &event_id))
        .unwrap();
    let wire = issuer.encode(&credential).unwrap();

    let mut handles = Vec::new();
    for i in 0..SCANNERS {
        let validator = validator.clone();
        let wire = wire.clone();
        let event_id = event_id.clone();
        handles.push(std::thread::spawn(move || {
            validator
                .validate(&wire, Some(&event_id), &format!("kiosk-{i}"), "gate")
                .outcome
        }));
    }

    let outcomes: Vec<ScanOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let valid = outcomes.iter().filter(|o| **o == ScanOutcome::Valid).count();
    let duplicate = outcomes
        .iter()
        .filter(|o| **o == ScanOutcome::Duplicate)
        .count();

    assert_eq!(valid, 1);
    assert_eq!(duplicate, SCANNERS - 1);
}

/// N > K concurrent registrations for a K-slot event: exactly K succeed,
/// the rest fail EventFull, and the final counter equals K.
#[test]
fn concurrent_issuance_never_overbooks() {
    const CAPACITY: u32 = 10;
    const STUDENTS: usize = 40;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(8)
        .build()
        .unwrap();
    let (issuer, _, events, event_id) = engine(CAPACITY);
    let issuer = Arc::new(issuer);

    let results = rt.block_on(async {
        let mut handles = Vec::new();
        for i in 0..STUDENTS {
            let issuer = issuer.clone();
            let event_id = event_id.clone();
            handles.push(tokio::spawn(async move {
                issuer.issue(&StudentId::new(format!("s{i}")), &event_id).await
            }));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, CAPACITY as usize);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(result, Err(Error::EventFull { .. })));
    }
    assert_eq!(events.participant_count(&event_id), Some(CAPACITY));
}

/// Retried duplicate issuance for one (student, event) pair: the second
/// call always reports AlreadyRegistered and never burns a second slot.
#[test]
fn duplicate_registration_rejected_under_retry() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (issuer, _, events, event_id) = engine(5);

    rt.block_on(async {
        issuer.issue(&StudentId::new("s1"), &event_id).await.unwrap();
        for _ in 0..3 {
            let err = issuer
                .issue(&StudentId::new("s1"), &event_id)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::AlreadyRegistered { .. }));
        }
    });
    assert_eq!(events.participant_count(&event_id), Some(1));
}
