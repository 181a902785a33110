//! GatePass Credential Core
//!
//! Signed attendance credentials for event registrations.
//!
//! # Architecture
//!
//! - **Tamper evidence**: Every credential carries an HMAC-SHA256 signature
//!   over a fixed canonical field order
//! - **Single wire shape**: One payload format for all issuance paths
//! - **Constant-time verification**: Signature comparison never short-circuits
//!
//! # Invariants
//!
//! - The signature is a deterministic function of the canonical fields;
//!   mutating any of them invalidates it
//! - Display fields (event title, student name) are never part of the
//!   signed material and never drive authorization
//! - The secret key is loaded once at startup and never logged

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod codec;
pub mod config;
pub mod error;
pub mod types;

// Re-exports
pub use codec::CredentialCodec;
pub use config::SecretKey;
pub use error::{Error, Result};
pub use types::{CredentialClaims, EventId, RegistrationId, SignedCredential, StudentId};
