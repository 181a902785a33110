//! Capacity types

use chrono::{DateTime, Utc};
use credential_core::EventId;
use serde::{Deserialize, Serialize};

/// Point-in-time view of an event's registration window
///
/// Read from the event directory at reservation time. The participant
/// counter is deliberately not part of the snapshot: it is shared mutable
/// state and is only ever touched atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSnapshot {
    /// Event identifier
    pub event_id: EventId,

    /// Display title
    pub title: String,

    /// Maximum participant count
    pub max_participants: u32,

    /// Last instant registration is allowed
    pub registration_deadline: DateTime<Utc>,

    /// Event end time; credentials expire here
    pub ends_at: DateTime<Utc>,
}

/// Proof of one reserved registration slot
///
/// Minted by a successful reservation; permits exactly one registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationToken {
    /// Event the slot belongs to
    pub event_id: EventId,

    /// Participant count after this reservation (1-based)
    pub slot: u32,

    /// Reservation timestamp
    pub reserved_at: DateTime<Utc>,
}
