//! GatePass Registration Store
//!
//! Registration lifecycle state and the append-only scan audit ledger.
//!
//! # Architecture
//!
//! - **Compare-and-set transitions**: status changes succeed only from an
//!   exact expected state, under an exclusive entry guard
//! - **One write, two projections**: every redemption attempt lands in the
//!   scan ledger and, when the registration is known, in its denormalized
//!   scan history, from a single `record_scan` call
//! - **Append-only audit**: ledger entries are never mutated or deleted
//!
//! # Invariants
//!
//! - At most one non-cancelled registration per (student, event)
//! - Attended and Cancelled are terminal; no transition leaves them
//! - Registrations are destroyed only by explicit administrative deletion

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod error;
pub mod ledger;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Error, Result};
pub use ledger::ScanLedger;
pub use store::RegistrationStore;
pub use types::{Registration, RegistrationStatus, ScanEntry, ScanOutcome, ScanRecord};
