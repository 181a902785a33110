//! Event directory collaborator seam
//!
//! The portal owns event metadata and the participant counter; the engine
//! reaches both through [`EventDirectory`]. The in-memory implementation
//! backs tests and the demo binary.

use crate::{types::EventSnapshot, Error, Result};
use async_trait::async_trait;
use credential_core::EventId;
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

/// Event repository collaborator
///
/// `participant_counter` hands out the event's shared counter so the
/// coordinator can perform its bound-checked compare-and-swap directly on
/// the authoritative value; there is no separate copy to drift.
#[async_trait]
pub trait EventDirectory: Send + Sync {
    /// Metadata snapshot for an event
    async fn snapshot(&self, event_id: &EventId) -> Result<EventSnapshot>;

    /// The event's shared participant counter
    async fn participant_counter(&self, event_id: &EventId) -> Result<Arc<AtomicU32>>;
}

#[derive(Debug)]
struct StoredEvent {
    snapshot: EventSnapshot,
    counter: Arc<AtomicU32>,
}

/// In-memory event directory
#[derive(Debug, Default)]
pub struct InMemoryEventDirectory {
    events: DashMap<EventId, StoredEvent>,
}

impl InMemoryEventDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event with its current participant count
    pub fn add_event(&self, snapshot: EventSnapshot, current_participants: u32) {
        self.events.insert(
            snapshot.event_id.clone(),
            StoredEvent {
                snapshot,
                counter: Arc::new(AtomicU32::new(current_participants)),
            },
        );
    }

    /// Current participant count, if the event exists
    pub fn participant_count(&self, event_id: &EventId) -> Option<u32> {
        self.events
            .get(event_id)
            .map(|e| e.counter.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl EventDirectory for InMemoryEventDirectory {
    async fn snapshot(&self, event_id: &EventId) -> Result<EventSnapshot> {
        self.events
            .get(event_id)
            .map(|e| e.snapshot.clone())
            .ok_or_else(|| Error::EventNotFound(event_id.to_string()))
    }

    async fn participant_counter(&self, event_id: &EventId) -> Result<Arc<AtomicU32>> {
        self.events
            .get(event_id)
            .map(|e| e.counter.clone())
            .ok_or_else(|| Error::EventNotFound(event_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_unknown_event() {
        let directory = InMemoryEventDirectory::new();
        let missing = EventId::new("nope");
        assert!(matches!(
            directory.snapshot(&missing).await,
            Err(Error::EventNotFound(_))
        ));
        assert!(directory.participant_counter(&missing).await.is_err());
    }

    #[tokio::test]
    async fn test_counter_is_shared() {
        let directory = InMemoryEventDirectory::new();
        let event_id = EventId::new("evt-1");
        directory.add_event(
            EventSnapshot {
                event_id: event_id.clone(),
                title: "Tech Talk".to_string(),
                max_participants: 50,
                registration_deadline: Utc::now() + Duration::hours(1),
                ends_at: Utc::now() + Duration::hours(3),
            },
            7,
        );

        let counter = directory.participant_counter(&event_id).await.unwrap();
        counter.fetch_add(1, Ordering::SeqCst);
        assert_eq!(directory.participant_count(&event_id), Some(8));
    }
}
