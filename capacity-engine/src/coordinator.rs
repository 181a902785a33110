//! Capacity coordinator
//!
//! Reserves and releases event registration slots. The reservation is a
//! single atomic unit: deadline gate, then a bound-checked compare-and-swap
//! on the event's shared counter with retry on contention.

use crate::{
    directory::EventDirectory,
    types::ReservationToken,
    Error, Result,
};
use chrono::Utc;
use credential_core::EventId;
use std::sync::{atomic::Ordering, Arc};
use tracing::{debug, warn};

/// Capacity coordinator
#[derive(Clone)]
pub struct CapacityCoordinator {
    directory: Arc<dyn EventDirectory>,
}

impl std::fmt::Debug for CapacityCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapacityCoordinator").finish_non_exhaustive()
    }
}

impl CapacityCoordinator {
    /// Create a coordinator over an event directory
    pub fn new(directory: Arc<dyn EventDirectory>) -> Self {
        Self { directory }
    }

    /// Reserve one registration slot
    ///
    /// Rejects past-deadline requests before touching the counter, then
    /// loops: load the count, fail [`Error::EventFull`] at the bound,
    /// otherwise `compare_exchange` the increment and retry if another
    /// reservation won the slot in between. The counter never overshoots
    /// `max_participants` and no increment is ever lost.
    pub async fn reserve(&self, event_id: &EventId) -> Result<ReservationToken> {
        let snapshot = self.directory.snapshot(event_id).await?;
        let now = Utc::now();

        if now > snapshot.registration_deadline {
            warn!(
                %event_id,
                deadline = %snapshot.registration_deadline,
                "Reservation rejected: deadline passed"
            );
            return Err(Error::DeadlinePassed {
                event: event_id.to_string(),
                deadline: snapshot.registration_deadline,
            });
        }

        let counter = self.directory.participant_counter(event_id).await?;
        loop {
            let current = counter.load(Ordering::SeqCst);
            if current >= snapshot.max_participants {
                debug!(%event_id, capacity = snapshot.max_participants, "Reservation rejected: event full");
                return Err(Error::EventFull {
                    event: event_id.to_string(),
                    capacity: snapshot.max_participants,
                });
            }

            match counter.compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => {
                    debug!(%event_id, slot = current + 1, "Slot reserved");
                    return Ok(ReservationToken {
                        event_id: event_id.clone(),
                        slot: current + 1,
                        reserved_at: now,
                    });
                }
                // Lost the CAS to a concurrent reservation; re-check the bound
                Err(_) => continue,
            }
        }
    }

    /// Release one reserved slot
    ///
    /// Used on unregistration and as the compensating action when issuance
    /// fails after a slot was reserved. Race-safe against concurrent
    /// reserves; the counter never goes below zero.
    pub async fn release(&self, event_id: &EventId) -> Result<()> {
        let counter = self.directory.participant_counter(event_id).await?;
        let released = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                current.checked_sub(1)
            })
            .is_ok();

        if released {
            debug!(%event_id, "Slot released");
        } else {
            warn!(%event_id, "Release on empty counter ignored");
        }
        Ok(())
    }
}
