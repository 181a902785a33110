//! Error types for the credential codec

use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Codec errors
#[derive(Error, Debug)]
pub enum Error {
    /// Payload is not parseable as a credential
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Required wire fields are absent
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Secret key material is unusable
    #[error("Invalid secret key: {0}")]
    InvalidKey(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
