//! GatePass Capacity Engine
//!
//! Atomic reservation of event registration slots under concurrent load.
//!
//! # Architecture
//!
//! - **Bound-checked CAS**: every reservation is a compare-and-swap on the
//!   event's shared participant counter; under N concurrent reserves with K
//!   slots free, exactly K succeed and the counter increments exactly K times
//! - **Deadline gate**: reservations past the registration deadline are
//!   rejected before the counter is touched
//! - **Collaborator seam**: event metadata and the counter come from the
//!   portal's event repository behind the [`EventDirectory`] trait
//!
//! Plain read-then-write on the counter is forbidden everywhere; that is the
//! over-booking race this crate exists to prevent.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod coordinator;
pub mod directory;
pub mod error;
pub mod types;

// Re-exports
pub use coordinator::CapacityCoordinator;
pub use directory::{EventDirectory, InMemoryEventDirectory};
pub use error::{Error, Result};
pub use types::{EventSnapshot, ReservationToken};
