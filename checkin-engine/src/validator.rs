//! Credential validation and redemption
//!
//! A redemption attempt walks a fixed pipeline:
//!
//! `Decoding → FieldCheck → SignatureCheck → EventMatchCheck → LookupCheck →
//! CancelledCheck → ExpiryCheck → DuplicateCheck → Commit`
//!
//! `Valid` is only reachable through a successful commit — the atomic
//! registered→attended transition. The earlier duplicate status read exists
//! so the audit log can tell "already used" apart from a race loser; the
//! transition is the authoritative single-use guard.
//!
//! Every attempt, accepted or rejected, writes exactly one scan-ledger
//! entry (with its denormalized projection) through the store's single
//! `record_scan` write.

use crate::metrics::Metrics;
use chrono::{DateTime, Utc};
use credential_core::{CredentialCodec, Error as CodecError, EventId, RegistrationId};
use registration_store::{RegistrationStatus, RegistrationStore, ScanEntry, ScanOutcome};
use std::sync::Arc;
use tracing::{info, warn};

/// Pipeline stage a redemption attempt ended at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    /// Payload parsing
    Decoding,
    /// Required wire fields present
    FieldCheck,
    /// Signature verification
    SignatureCheck,
    /// Scanner's expected event matches the credential
    EventMatchCheck,
    /// Registration triple lookup
    LookupCheck,
    /// Registration not cancelled
    CancelledCheck,
    /// Credential not expired
    ExpiryCheck,
    /// Attendance not already committed
    DuplicateCheck,
    /// Atomic registered→attended transition
    Commit,
}

/// Result of one redemption attempt
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Attempt outcome
    pub outcome: ScanOutcome,

    /// Stage the attempt ended at
    pub stage: ValidationStage,

    /// Human-readable reason
    ///
    /// The audit note usually matches this; for undecodable payloads the
    /// note additionally carries a truncated sample of the raw payload.
    pub reason: String,

    /// Registration presented, when the payload decoded far enough
    pub registration_id: Option<RegistrationId>,

    /// Attempt timestamp
    pub scanned_at: DateTime<Utc>,
}

impl ValidationResult {
    /// Whether attendance was committed by this attempt
    pub fn is_valid(&self) -> bool {
        self.outcome == ScanOutcome::Valid
    }
}

struct Assessment {
    outcome: ScanOutcome,
    stage: ValidationStage,
    reason: String,
    // Audit-only detail appended to the reason in the ledger note
    note_detail: Option<String>,
    registration_id: Option<RegistrationId>,
}

impl Assessment {
    fn invalid(
        stage: ValidationStage,
        reason: impl Into<String>,
        registration_id: Option<RegistrationId>,
    ) -> Self {
        Self {
            outcome: ScanOutcome::Invalid,
            stage,
            reason: reason.into(),
            note_detail: None,
            registration_id,
        }
    }

    fn audit_note(&self) -> String {
        match &self.note_detail {
            Some(detail) => format!("{}: {}", self.reason, detail),
            None => self.reason.clone(),
        }
    }
}

/// Longest raw-payload sample carried in an audit note
const NOTE_SAMPLE_CHARS: usize = 64;

fn payload_sample(raw: &str) -> String {
    raw.chars().take(NOTE_SAMPLE_CHARS).collect()
}

/// Credential validator
pub struct CredentialValidator {
    store: Arc<RegistrationStore>,
    codec: Arc<CredentialCodec>,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialValidator").finish_non_exhaustive()
    }
}

impl CredentialValidator {
    /// Create a new validator
    pub fn new(
        store: Arc<RegistrationStore>,
        codec: Arc<CredentialCodec>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            codec,
            metrics,
        }
    }

    /// Redeem a presented credential
    ///
    /// Infallible at the API level: always returns a result and always
    /// audits. `expected_event` pins the scanner to one event so a
    /// credential for another event is rejected as "wrong event".
    pub fn validate(
        &self,
        raw_payload: &str,
        expected_event: Option<&EventId>,
        scanned_by: &str,
        location: &str,
    ) -> ValidationResult {
        let scanned_at = Utc::now();
        let timer = self.metrics.validation_duration.start_timer();

        let assessment = self.assess(raw_payload, expected_event, scanned_at);

        // Exactly one audit entry per attempt, success and rejection alike
        self.store.record_scan(ScanEntry::new(
            assessment.registration_id.clone(),
            scanned_by,
            location,
            assessment.outcome,
            assessment.audit_note(),
        ));

        self.metrics.scans_total.inc();
        match assessment.outcome {
            ScanOutcome::Valid => self.metrics.scans_valid_total.inc(),
            ScanOutcome::Invalid => self.metrics.scans_invalid_total.inc(),
            ScanOutcome::Expired => self.metrics.scans_expired_total.inc(),
            ScanOutcome::Duplicate => self.metrics.scans_duplicate_total.inc(),
        }
        timer.observe_duration();

        info!(
            outcome = ?assessment.outcome,
            stage = ?assessment.stage,
            reason = %assessment.reason,
            scanned_by,
            location,
            "Redemption attempt"
        );

        ValidationResult {
            outcome: assessment.outcome,
            stage: assessment.stage,
            reason: assessment.reason,
            registration_id: assessment.registration_id,
            scanned_at,
        }
    }

    fn assess(
        &self,
        raw_payload: &str,
        expected_event: Option<&EventId>,
        now: DateTime<Utc>,
    ) -> Assessment {
        // Decoding / FieldCheck
        let credential = match CredentialCodec::decode(raw_payload) {
            Ok(credential) => credential,
            Err(CodecError::MissingFields(fields)) => {
                return Assessment::invalid(
                    ValidationStage::FieldCheck,
                    format!("missing required fields: {}", fields.join(", ")),
                    None,
                );
            }
            Err(_) => {
                // The audit trail keeps a sample of what was presented; the
                // caller-facing reason stays stable
                return Assessment {
                    outcome: ScanOutcome::Invalid,
                    stage: ValidationStage::Decoding,
                    reason: "malformed payload".to_string(),
                    note_detail: Some(payload_sample(raw_payload)),
                    registration_id: None,
                };
            }
        };
        let registration_id = Some(credential.registration_id().clone());

        // SignatureCheck: reason stays generic; which field differs is
        // exactly what a forger wants to know
        if !self.codec.verify(&credential) {
            warn!(
                registration_id = %credential.registration_id(),
                "Signature mismatch on presented credential"
            );
            return Assessment::invalid(
                ValidationStage::SignatureCheck,
                "bad signature",
                registration_id,
            );
        }

        // EventMatchCheck
        if let Some(expected) = expected_event {
            if expected != credential.event_id() {
                return Assessment::invalid(
                    ValidationStage::EventMatchCheck,
                    "wrong event",
                    registration_id,
                );
            }
        }

        // LookupCheck: exact triple, so no field substitution replays
        let registration = match self.store.find(
            credential.registration_id(),
            credential.student_id(),
            credential.event_id(),
        ) {
            Ok(registration) => registration,
            Err(_) => {
                return Assessment::invalid(
                    ValidationStage::LookupCheck,
                    "registration not found",
                    registration_id,
                );
            }
        };

        // CancelledCheck: resolved registrations never reach the commit, so
        // the audit trail names the real status instead of a race artifact
        match registration.status {
            RegistrationStatus::Cancelled => {
                return Assessment::invalid(
                    ValidationStage::CancelledCheck,
                    "registration cancelled",
                    registration_id,
                );
            }
            RegistrationStatus::Absent => {
                return Assessment::invalid(
                    ValidationStage::CancelledCheck,
                    "marked absent",
                    registration_id,
                );
            }
            RegistrationStatus::Registered | RegistrationStatus::Attended => {}
        }

        // ExpiryCheck: lazy, against the credential's own expires_at
        if credential.is_expired(now) {
            return Assessment {
                outcome: ScanOutcome::Expired,
                stage: ValidationStage::ExpiryCheck,
                reason: "credential expired".to_string(),
                note_detail: None,
                registration_id,
            };
        }

        // DuplicateCheck: status read for the audit trail only
        if registration.status == RegistrationStatus::Attended {
            return Assessment {
                outcome: ScanOutcome::Duplicate,
                stage: ValidationStage::DuplicateCheck,
                reason: "already checked in".to_string(),
                note_detail: None,
                registration_id,
            };
        }

        // Commit: the single-use enforcement point
        match self.store.transition(
            credential.registration_id(),
            RegistrationStatus::Registered,
            RegistrationStatus::Attended,
        ) {
            Ok(true) => Assessment {
                outcome: ScanOutcome::Valid,
                stage: ValidationStage::Commit,
                reason: "checked in".to_string(),
                note_detail: None,
                registration_id,
            },
            // All prior checks passed, but a concurrent scan won the
            // transition; this attempt is a duplicate, not valid
            Ok(false) => Assessment {
                outcome: ScanOutcome::Duplicate,
                stage: ValidationStage::Commit,
                reason: "concurrent check-in won".to_string(),
                note_detail: None,
                registration_id,
            },
            // Registration vanished between lookup and commit
            Err(_) => Assessment::invalid(
                ValidationStage::Commit,
                "registration not found",
                registration_id,
            ),
        }
    }
}
