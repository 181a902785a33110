//! Concurrent registration store
//!
//! In-memory, thread-safe store keyed by registration id, with a secondary
//! (student, event) index enforcing the one-active-registration invariant.
//! Status changes go through a compare-and-set under the map's exclusive
//! entry guard; plain read-then-write is never used.

use crate::{
    ledger::ScanLedger,
    types::{Registration, RegistrationStatus, ScanEntry},
    Error, Result,
};
use credential_core::{EventId, RegistrationId, StudentId};
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use tracing::debug;

/// Registration store
///
/// Lock order where operations touch both maps: (student, event) index
/// first, then the registration map.
#[derive(Debug)]
pub struct RegistrationStore {
    /// All registrations, keyed by registration id
    registrations: DashMap<RegistrationId, Registration>,

    /// Latest registration per (student, event) pair
    active: DashMap<(StudentId, EventId), RegistrationId>,

    /// Shared scan ledger; the store is the only writer
    ledger: Arc<ScanLedger>,
}

impl RegistrationStore {
    /// Create a store writing to the given ledger
    pub fn new(ledger: Arc<ScanLedger>) -> Self {
        Self {
            registrations: DashMap::new(),
            active: DashMap::new(),
            ledger,
        }
    }

    /// The scan ledger this store writes to
    pub fn ledger(&self) -> &Arc<ScanLedger> {
        &self.ledger
    }

    /// Persist a new registration
    ///
    /// Fails with [`Error::DuplicateRegistration`] when a non-cancelled
    /// registration already exists for the (student, event) pair. The
    /// duplicate check AND both map writes happen under one index entry
    /// guard: a concurrent create for the same pair blocks on the guard and,
    /// once it acquires it, sees the indexed registration already stored.
    /// Publishing the index before the registration would open a window
    /// where the entry dangles and the pair looks unblocked.
    pub fn create(&self, registration: Registration) -> Result<()> {
        let key = (
            registration.student_id.clone(),
            registration.event_id.clone(),
        );
        let registration_id = registration.registration_id.clone();

        match self.active.entry(key) {
            Entry::Occupied(mut occupied) => {
                let existing_id = occupied.get().clone();
                let blocked = self
                    .registrations
                    .get(&existing_id)
                    .map(|r| r.status != RegistrationStatus::Cancelled)
                    .unwrap_or(false);

                if blocked {
                    return Err(Error::DuplicateRegistration {
                        student: registration.student_id.to_string(),
                        event: registration.event_id.to_string(),
                    });
                }
                // Cancelled prior registration does not block re-registration
                self.registrations
                    .insert(registration_id.clone(), registration);
                occupied.insert(registration_id.clone());
            }
            Entry::Vacant(vacant) => {
                self.registrations
                    .insert(registration_id.clone(), registration);
                vacant.insert(registration_id.clone());
            }
        }

        debug!(%registration_id, "Registration created");
        Ok(())
    }

    /// Look up a registration by the exact (id, student, event) triple
    ///
    /// Any substituted field yields [`Error::NotFound`]; a credential cannot
    /// be replayed by swapping one identifier.
    pub fn find(
        &self,
        registration_id: &RegistrationId,
        student_id: &StudentId,
        event_id: &EventId,
    ) -> Result<Registration> {
        self.registrations
            .get(registration_id)
            .filter(|r| r.student_id == *student_id && r.event_id == *event_id)
            .map(|r| r.clone())
            .ok_or_else(|| Error::NotFound(registration_id.to_string()))
    }

    /// Get a registration by id
    pub fn get(&self, registration_id: &RegistrationId) -> Result<Registration> {
        self.registrations
            .get(registration_id)
            .map(|r| r.clone())
            .ok_or_else(|| Error::NotFound(registration_id.to_string()))
    }

    /// Current status of a registration
    pub fn status(&self, registration_id: &RegistrationId) -> Result<RegistrationStatus> {
        self.registrations
            .get(registration_id)
            .map(|r| r.status)
            .ok_or_else(|| Error::NotFound(registration_id.to_string()))
    }

    /// Denormalized scan history of a registration
    pub fn scan_history(&self, registration_id: &RegistrationId) -> Result<Vec<crate::ScanRecord>> {
        self.registrations
            .get(registration_id)
            .map(|r| r.scan_history.clone())
            .ok_or_else(|| Error::NotFound(registration_id.to_string()))
    }

    /// All registrations for an event (for the organizer views)
    pub fn registrations_for_event(&self, event_id: &EventId) -> Vec<Registration> {
        self.registrations
            .iter()
            .filter(|r| r.event_id == *event_id)
            .map(|r| r.clone())
            .collect()
    }

    /// Whether a non-cancelled registration exists for (student, event)
    pub fn has_active(&self, student_id: &StudentId, event_id: &EventId) -> bool {
        let key = (student_id.clone(), event_id.clone());
        self.active
            .get(&key)
            .and_then(|id| self.registrations.get(id.value()).map(|r| r.status))
            .map(|status| status != RegistrationStatus::Cancelled)
            .unwrap_or(false)
    }

    /// Atomic compare-and-set on a registration's status
    ///
    /// Succeeds only when the current status equals `from`; returns
    /// `Ok(false)` on mismatch so callers can tell "already redeemed" apart
    /// from a system fault. Terminal states are never left, whatever the
    /// caller passes as `from`. This is the single-use enforcement point
    /// for attendance marking.
    pub fn transition(
        &self,
        registration_id: &RegistrationId,
        from: RegistrationStatus,
        to: RegistrationStatus,
    ) -> Result<bool> {
        let mut registration = self
            .registrations
            .get_mut(registration_id)
            .ok_or_else(|| Error::NotFound(registration_id.to_string()))?;

        if registration.status != from || registration.status.is_terminal() {
            return Ok(false);
        }
        registration.status = to;
        debug!(%registration_id, ?from, ?to, "Registration status transitioned");
        Ok(true)
    }

    /// Cancel a registration (externally triggered)
    ///
    /// Returns `Ok(false)` when the registration is not in `Registered`
    /// (terminal states are never left). On success the (student, event)
    /// slot is freed for re-registration.
    pub fn cancel(&self, registration_id: &RegistrationId) -> Result<bool> {
        if !self.transition(
            registration_id,
            RegistrationStatus::Registered,
            RegistrationStatus::Cancelled,
        )? {
            return Ok(false);
        }

        let registration = self.get(registration_id)?;
        let key = (registration.student_id, registration.event_id);
        self.active
            .remove_if(&key, |_, active_id| active_id == registration_id);
        Ok(true)
    }

    /// Record a redemption attempt
    ///
    /// One write, two projections: the entry is appended to the scan ledger
    /// and its denormalized record is pushed into the registration's
    /// history. Idempotent by entry id; a retried call writes neither
    /// projection twice.
    pub fn record_scan(&self, entry: ScanEntry) {
        if !self.ledger.append(entry.clone()) {
            return;
        }
        if let Some(registration_id) = &entry.registration_id {
            if let Some(mut registration) = self.registrations.get_mut(registration_id) {
                registration.scan_history.push(entry.record());
            }
        }
    }

    /// Administrative deletion (user-deletion cascade)
    ///
    /// The engine itself never calls this; registrations are destroyed only
    /// by the portal's admin surface.
    pub fn remove(&self, registration_id: &RegistrationId) -> Result<()> {
        let (_, registration) = self
            .registrations
            .remove(registration_id)
            .ok_or_else(|| Error::NotFound(registration_id.to_string()))?;

        let key = (registration.student_id, registration.event_id);
        self.active
            .remove_if(&key, |_, active_id| active_id == registration_id);
        Ok(())
    }

    /// Number of stored registrations
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
