//! Registration and scan-audit types

use chrono::{DateTime, Utc};
use credential_core::{EventId, RegistrationId, SignedCredential, StudentId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Registered, credential issued, not yet scanned
    Registered,
    /// Checked in (terminal)
    Attended,
    /// Marked absent after the event
    Absent,
    /// Cancelled by the student or an organizer (terminal)
    Cancelled,
}

impl RegistrationStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, RegistrationStatus::Attended | RegistrationStatus::Cancelled)
    }
}

/// A student's registration for an event
///
/// Created at successful issuance. Status is mutated only through the
/// store's compare-and-set [`transition`](crate::RegistrationStore::transition).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Unique registration token
    pub registration_id: RegistrationId,

    /// Registered student
    pub student_id: StudentId,

    /// Event registered for
    pub event_id: EventId,

    /// Lifecycle status
    pub status: RegistrationStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// The signed credential minted at issuance
    pub credential: SignedCredential,

    /// Denormalized copy of this registration's scan-ledger entries,
    /// in append order
    pub scan_history: Vec<ScanRecord>,
}

impl Registration {
    /// Create a fresh registration around an issued credential
    pub fn new(credential: SignedCredential) -> Self {
        Self {
            registration_id: credential.registration_id().clone(),
            student_id: credential.student_id().clone(),
            event_id: credential.event_id().clone(),
            status: RegistrationStatus::Registered,
            created_at: Utc::now(),
            credential,
            scan_history: Vec::new(),
        }
    }
}

/// Outcome of a redemption attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Credential accepted; attendance committed
    Valid,
    /// Rejected: malformed, forged, wrong event, unknown or cancelled
    Invalid,
    /// Rejected: past the credential's expiry
    Expired,
    /// Rejected: attendance already committed (or lost a concurrent race)
    Duplicate,
}

/// Scan ledger entry: one redemption attempt, accepted or rejected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEntry {
    /// Unique entry id (idempotency key for the dual projection)
    pub entry_id: Uuid,

    /// Registration presented, when the payload decoded far enough to name one
    pub registration_id: Option<RegistrationId>,

    /// Attempt timestamp
    pub scanned_at: DateTime<Utc>,

    /// Scanning agent identity (organizer account, kiosk id)
    pub scanned_by: String,

    /// Scanning location label (gate, hall)
    pub location: String,

    /// Attempt outcome
    pub outcome: ScanOutcome,

    /// Free-text note (rejection reason, raw-payload sample)
    pub note: String,
}

impl ScanEntry {
    /// Build an entry for a fresh attempt
    pub fn new(
        registration_id: Option<RegistrationId>,
        scanned_by: impl Into<String>,
        location: impl Into<String>,
        outcome: ScanOutcome,
        note: impl Into<String>,
    ) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            registration_id,
            scanned_at: Utc::now(),
            scanned_by: scanned_by.into(),
            location: location.into(),
            outcome,
            note: note.into(),
        }
    }

    /// The denormalized per-registration projection of this entry
    pub fn record(&self) -> ScanRecord {
        ScanRecord {
            entry_id: self.entry_id,
            scanned_at: self.scanned_at,
            scanned_by: self.scanned_by.clone(),
            location: self.location.clone(),
            outcome: self.outcome,
            note: self.note.clone(),
        }
    }
}

/// Denormalized scan record embedded in a registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Ledger entry this record mirrors
    pub entry_id: Uuid,

    /// Attempt timestamp
    pub scanned_at: DateTime<Utc>,

    /// Scanning agent identity
    pub scanned_by: String,

    /// Scanning location label
    pub location: String,

    /// Attempt outcome
    pub outcome: ScanOutcome,

    /// Free-text note
    pub note: String,
}
