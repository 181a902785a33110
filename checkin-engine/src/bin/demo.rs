//! Check-in engine demo binary
//!
//! Walks the full credential lifecycle against the in-memory directories:
//! issuance up to capacity, a valid scan, a duplicate scan and a tampered
//! payload.

use capacity_engine::{CapacityCoordinator, EventSnapshot, InMemoryEventDirectory};
use checkin_engine::{CredentialIssuer, CredentialValidator, InMemoryUserDirectory, Metrics};
use chrono::{Duration, Utc};
use credential_core::{CredentialCodec, EventId, SecretKey, StudentId};
use registration_store::{RegistrationStore, ScanLedger};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting GatePass check-in demo");

    let key = match SecretKey::from_env("GATEPASS_SECRET_KEY") {
        Ok(key) => key,
        Err(_) => {
            tracing::warn!("GATEPASS_SECRET_KEY not set, using a demo key");
            SecretKey::from_hex("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")?
        }
    };
    let codec = Arc::new(CredentialCodec::new(key));

    // Collaborators: one event with a single remaining slot
    let events = Arc::new(InMemoryEventDirectory::new());
    let event_id = EventId::new("evt-annual-tech-fest");
    events.add_event(
        EventSnapshot {
            event_id: event_id.clone(),
            title: "Annual Tech Fest".to_string(),
            max_participants: 1,
            registration_deadline: Utc::now() + Duration::hours(1),
            ends_at: Utc::now() + Duration::hours(8),
        },
        0,
    );

    let users = Arc::new(InMemoryUserDirectory::new());
    users.add_student(StudentId::new("STU2026001"), "Priya Sharma");
    users.add_student(StudentId::new("STU2026002"), "Ravi Kumar");

    let store = Arc::new(RegistrationStore::new(Arc::new(ScanLedger::new())));
    let metrics = Arc::new(Metrics::new()?);

    let issuer = CredentialIssuer::new(
        CapacityCoordinator::new(events.clone()),
        events.clone(),
        users,
        store.clone(),
        codec.clone(),
        metrics.clone(),
    );
    let validator = CredentialValidator::new(store.clone(), codec, metrics.clone());

    // Registration: first student takes the last slot
    let credential = issuer
        .issue(&StudentId::new("STU2026001"), &event_id)
        .await?;
    println!(
        "issued credential {} ({}/1 participants)",
        credential.registration_id(),
        events.participant_count(&event_id).unwrap_or(0),
    );

    // Second student: event is full
    match issuer.issue(&StudentId::new("STU2026002"), &event_id).await {
        Err(err) => println!("second registration rejected: {err}"),
        Ok(_) => anyhow::bail!("over-booked a full event"),
    }

    // Redemption at the gate
    let wire = issuer.encode(&credential)?;
    let result = validator.validate(&wire, Some(&event_id), "organizer-1", "main-gate");
    println!("first scan: {:?} ({})", result.outcome, result.reason);

    let result = validator.validate(&wire, Some(&event_id), "organizer-1", "main-gate");
    println!("second scan: {:?} ({})", result.outcome, result.reason);

    // Tampered signature: flip one character
    let mut flipped = credential.signature.clone();
    let first = if flipped.starts_with('0') { "1" } else { "0" };
    flipped.replace_range(0..1, first);
    let tampered = wire.replace(&credential.signature, &flipped);
    let result = validator.validate(&tampered, Some(&event_id), "organizer-1", "main-gate");
    println!("tampered scan: {:?} ({})", result.outcome, result.reason);

    println!(
        "scan ledger holds {} entries; issued={} valid={} duplicate={} invalid={}",
        store.ledger().len(),
        metrics.credentials_issued_total.get(),
        metrics.scans_valid_total.get(),
        metrics.scans_duplicate_total.get(),
        metrics.scans_invalid_total.get(),
    );

    tracing::info!("Demo complete");
    Ok(())
}
