//! Error types for the registration store

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Store errors
#[derive(Error, Debug)]
pub enum Error {
    /// A non-cancelled registration already exists for this (student, event)
    #[error("Student {student} already has an active registration for event {event}")]
    DuplicateRegistration {
        /// Student holding the existing registration
        student: String,
        /// Event the registration is for
        event: String,
    },

    /// Registration not found (or triple mismatch on lookup)
    #[error("Registration not found: {0}")]
    NotFound(String),
}
