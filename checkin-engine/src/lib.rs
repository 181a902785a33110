//! GatePass Check-in Engine
//!
//! Issues signed, event-bound, single-use attendance credentials and redeems
//! them under concurrent scanning.
//!
//! # Architecture
//!
//! - **Issuer**: eligibility check → capacity reservation → mint → persist,
//!   with a compensating release when persistence fails after the slot was
//!   reserved
//! - **Validator**: staged redemption pipeline ending in an atomic
//!   registered→attended transition; the transition, not any earlier status
//!   read, is the single-use guard
//! - **Audit**: every redemption attempt, accepted or rejected, writes
//!   exactly one scan-ledger entry
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use capacity_engine::{CapacityCoordinator, InMemoryEventDirectory};
//! use checkin_engine::{CredentialIssuer, CredentialValidator, InMemoryUserDirectory, Metrics};
//! use credential_core::{CredentialCodec, EventId, SecretKey, StudentId};
//! use registration_store::{RegistrationStore, ScanLedger};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = Arc::new(CredentialCodec::new(SecretKey::from_env("GATEPASS_SECRET_KEY")?));
//! let events = Arc::new(InMemoryEventDirectory::new());
//! let users = Arc::new(InMemoryUserDirectory::new());
//! let store = Arc::new(RegistrationStore::new(Arc::new(ScanLedger::new())));
//! let metrics = Arc::new(Metrics::new()?);
//!
//! let issuer = CredentialIssuer::new(
//!     CapacityCoordinator::new(events.clone()),
//!     events,
//!     users,
//!     store.clone(),
//!     codec.clone(),
//!     metrics.clone(),
//! );
//! let validator = CredentialValidator::new(store, codec, metrics);
//!
//! let credential = issuer
//!     .issue(&StudentId::new("STU42"), &EventId::new("evt-hackathon"))
//!     .await?;
//! let result = validator.validate(&issuer.encode(&credential)?, None, "kiosk-1", "main-gate");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod directory;
pub mod error;
pub mod issuer;
pub mod metrics;
pub mod validator;

// Re-exports
pub use config::Config;
pub use directory::{InMemoryUserDirectory, UserDirectory};
pub use error::{Error, Result};
pub use issuer::{BatchOutcome, CredentialIssuer};
pub use metrics::Metrics;
pub use validator::{CredentialValidator, ValidationResult, ValidationStage};
