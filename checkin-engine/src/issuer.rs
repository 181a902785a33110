//! Credential issuance
//!
//! Orchestrates: eligibility check → capacity reservation → mint → sign →
//! persist. The reservation is the only step with a side effect that can be
//! stranded, so a persistence failure triggers a compensating release.

use crate::{directory::UserDirectory, metrics::Metrics, Error, Result};
use capacity_engine::{CapacityCoordinator, EventDirectory};
use chrono::Utc;
use credential_core::{
    CredentialClaims, CredentialCodec, EventId, RegistrationId, SignedCredential, StudentId,
};
use registration_store::{Registration, RegistrationStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-event outcome of a batch issuance call
///
/// Partial success is expected and reported; one event failing never aborts
/// the rest of the batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Event this outcome is for
    pub event_id: EventId,

    /// The credential, or the tagged reason this event failed
    pub result: Result<SignedCredential>,
}

/// Credential issuer
pub struct CredentialIssuer {
    capacity: CapacityCoordinator,
    events: Arc<dyn EventDirectory>,
    users: Arc<dyn UserDirectory>,
    store: Arc<RegistrationStore>,
    codec: Arc<CredentialCodec>,
    metrics: Arc<Metrics>,
    max_batch_events: usize,
}

impl std::fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIssuer").finish_non_exhaustive()
    }
}

impl CredentialIssuer {
    /// Create a new issuer
    pub fn new(
        capacity: CapacityCoordinator,
        events: Arc<dyn EventDirectory>,
        users: Arc<dyn UserDirectory>,
        store: Arc<RegistrationStore>,
        codec: Arc<CredentialCodec>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            capacity,
            events,
            users,
            store,
            codec,
            metrics,
            max_batch_events: crate::Config::default().max_batch_events,
        }
    }

    /// Override the per-call batch issuance cap (from [`Config::max_batch_events`])
    ///
    /// [`Config::max_batch_events`]: crate::Config::max_batch_events
    pub fn with_batch_limit(mut self, max_batch_events: usize) -> Self {
        self.max_batch_events = max_batch_events;
        self
    }

    /// Issue a credential for one (student, event) registration
    ///
    /// Short-circuits on the first failing step. Capacity errors propagate
    /// with no further action; a persistence failure after the slot was
    /// reserved releases it again before the error reaches the caller, so a
    /// retry starts from a clean state.
    pub async fn issue(
        &self,
        student_id: &StudentId,
        event_id: &EventId,
    ) -> Result<SignedCredential> {
        // Eligibility: one active registration per (student, event)
        if self.store.has_active(student_id, event_id) {
            self.metrics.issuance_rejected_total.inc();
            return Err(Error::AlreadyRegistered {
                student: student_id.to_string(),
                event: event_id.to_string(),
            });
        }

        let snapshot = self.events.snapshot(event_id).await.map_err(Error::from)?;

        let token = match self.capacity.reserve(event_id).await {
            Ok(token) => token,
            Err(err) => {
                self.metrics.issuance_rejected_total.inc();
                return Err(err.into());
            }
        };
        debug!(%event_id, slot = token.slot, "Capacity reserved");

        let student_name = self.users.display_name(student_id).await;
        let claims = CredentialClaims {
            registration_id: RegistrationId::generate(),
            student_id: student_id.clone(),
            event_id: event_id.clone(),
            issued_at: Utc::now(),
            expires_at: Some(snapshot.ends_at),
            event_title: Some(snapshot.title),
            student_name,
        };
        let credential = self.codec.sign(claims);

        if let Err(err) = self.store.create(Registration::new(credential.clone())) {
            // Compensating action: the slot must not stay claimed by a
            // registration that was never persisted.
            if let Err(release_err) = self.capacity.release(event_id).await {
                warn!(%event_id, error = %release_err, "Compensating release failed");
            }
            self.metrics.issuance_rejected_total.inc();
            return Err(err.into());
        }

        self.metrics.credentials_issued_total.inc();
        info!(
            registration_id = %credential.registration_id(),
            %student_id,
            %event_id,
            slot = token.slot,
            "Credential issued"
        );
        Ok(credential)
    }

    /// Issue credentials for several events in one call
    ///
    /// Applies the single-event flow independently per event and collects a
    /// per-event outcome. Every path mints through the same claims shape and
    /// canonicalization as [`issue`](Self::issue). Events past the configured
    /// batch cap are not issued; their outcome is tagged [`Error::BatchLimit`]
    /// so the caller can resubmit the tail in a later call.
    pub async fn issue_batch(
        &self,
        student_id: &StudentId,
        event_ids: &[EventId],
    ) -> Vec<BatchOutcome> {
        if event_ids.len() > self.max_batch_events {
            warn!(
                %student_id,
                requested = event_ids.len(),
                limit = self.max_batch_events,
                "Batch issuance over cap, tail rejected"
            );
        }

        let mut outcomes = Vec::with_capacity(event_ids.len());
        for (index, event_id) in event_ids.iter().enumerate() {
            let result = if index < self.max_batch_events {
                self.issue(student_id, event_id).await
            } else {
                Err(Error::BatchLimit {
                    limit: self.max_batch_events,
                })
            };
            if let Err(err) = &result {
                debug!(%student_id, %event_id, error = %err, "Batch issuance: event failed");
            }
            outcomes.push(BatchOutcome {
                event_id: event_id.clone(),
                result,
            });
        }
        outcomes
    }

    /// Cancel a registration (externally triggered, e.g. student withdrew)
    ///
    /// Returns `Ok(false)` when the registration was not in `Registered`
    /// (already attended or already cancelled). On success the capacity slot
    /// is released and the (student, event) pair may register again.
    pub async fn cancel_registration(&self, registration_id: &RegistrationId) -> Result<bool> {
        let registration = self.store.get(registration_id)?;
        if !self.store.cancel(registration_id)? {
            return Ok(false);
        }

        if let Err(err) = self.capacity.release(&registration.event_id).await {
            warn!(%registration_id, error = %err, "Release after cancellation failed");
        }
        info!(%registration_id, event_id = %registration.event_id, "Registration cancelled");
        Ok(true)
    }

    /// Encode a credential to its QR wire form
    pub fn encode(&self, credential: &SignedCredential) -> Result<String> {
        Ok(self.codec.encode(credential)?)
    }
}
