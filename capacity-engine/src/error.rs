//! Error types for the capacity engine

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for capacity operations
pub type Result<T> = std::result::Result<T, Error>;

/// Capacity errors
#[derive(Error, Debug)]
pub enum Error {
    /// Event has no free slots
    #[error("Event {event} is full ({capacity} participants)")]
    EventFull {
        /// Event that is at capacity
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

    /// Event directory failure (retryable)
    #[error("Event directory error: {0}")]
    Directory(String),
}
