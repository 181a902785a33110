//! Error types for the check-in engine
//!
//! Business-rule rejections (already registered, event full, deadline
//! passed) are expected outcomes and carry human-readable context; they are
//! returned, never thrown away or panicked on. Storage and directory
//! failures are retryable by the caller — issuance is naturally
//! deduplicating, so a retry cannot double-register.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// Student already holds a non-cancelled registration for this event
    #[error("Student {student} is already registered for event {event}")]
    AlreadyRegistered {
        /// Student attempting to register again
        student: String,
        /// Event already registered for
        event: String,
    },

    /// Event has no free slots
    #[error("Event {event} is full ({capacity} participants)")]
    EventFull {
        /// Event at capacity
        event: String,
        /// The capacity that was reached
        capacity: u32,
    },

    /// Registration deadline has passed
    #[error("Registration deadline for event {event} passed at {deadline}")]
    DeadlinePassed {
        /// Event whose deadline passed
        event: String,
        /// The deadline that was missed
        deadline: DateTime<Utc>,
    },

    /// Event unknown to the directory
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// Registration unknown to the store
    #[error("Registration not found: {0}")]
    RegistrationNotFound(String),

    /// Batch issuance call carried more events than the configured cap
    #[error("Batch issuance limited to {limit} events per call")]
    BatchLimit {
        /// The configured per-call cap
        limit: usize,
    },

    /// Credential codec failure
    #[error("Credential error: {0}")]
    Credential(#[from] credential_core::Error),

    /// Event directory failure (retryable)
    #[error("Event directory error: {0}")]
    Directory(String),

    /// Storage failure during issuance (retryable; the reserved slot has
    /// already been released)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<capacity_engine::Error> for Error {
    fn from(err: capacity_engine::Error) -> Self {
        match err {
            capacity_engine::Error::EventFull { event, capacity } => {
                Error::EventFull { event, capacity }
            }
            capacity_engine::Error::DeadlinePassed { event, deadline } => {
                Error::DeadlinePassed { event, deadline }
            }
            capacity_engine::Error::EventNotFound(event) => Error::EventNotFound(event),
            capacity_engine::Error::Directory(msg) => Error::Directory(msg),
        }
    }
}

impl From<registration_store::Error> for Error {
    fn from(err: registration_store::Error) -> Self {
        match err {
            registration_store::Error::DuplicateRegistration { student, event } => {
                Error::AlreadyRegistered { student, event }
            }
            registration_store::Error::NotFound(id) => Error::RegistrationNotFound(id),
        }
    }
}
