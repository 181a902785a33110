//! Append-only scan ledger
//!
//! Every redemption attempt — accepted or rejected — lands here exactly
//! once. The core never mutates or deletes entries; retention and export
//! belong to the surrounding portal.

use crate::types::ScanEntry;
use credential_core::RegistrationId;
use parking_lot::RwLock;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Default)]
struct LedgerInner {
    entries: Vec<ScanEntry>,
    seen: HashSet<Uuid>,
}

/// Append-only audit log of redemption attempts
#[derive(Debug, Default)]
pub struct ScanLedger {
    inner: RwLock<LedgerInner>,
}

impl ScanLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    ///
    /// Idempotent by entry id: returns false (and writes nothing) when the
    /// entry was already appended, so a retried write cannot double-audit.
    pub fn append(&self, entry: ScanEntry) -> bool {
        let mut inner = self.inner.write();
        if !inner.seen.insert(entry.entry_id) {
            return false;
        }
        inner.entries.push(entry);
        true
    }

    /// All entries in append order
    pub fn entries(&self) -> Vec<ScanEntry> {
        self.inner.read().entries.clone()
    }

    /// Entries for a single registration, in append order
    pub fn entries_for(&self, registration_id: &RegistrationId) -> Vec<ScanEntry> {
        self.inner
            .read()
            .entries
            .iter()
            .filter(|e| e.registration_id.as_ref() == Some(registration_id))
            .cloned()
            .collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScanOutcome;

    fn entry(reg: &str, outcome: ScanOutcome) -> ScanEntry {
        ScanEntry::new(
            Some(RegistrationId::new(reg)),
            "kiosk-1",
            "main-gate",
            outcome,
            "",
        )
    }

    #[test]
    fn test_append_and_query() {
        let ledger = ScanLedger::new();
        assert!(ledger.is_empty());

        ledger.append(entry("reg-a", ScanOutcome::Valid));
        ledger.append(entry("reg-b", ScanOutcome::Invalid));
        ledger.append(entry("reg-a", ScanOutcome::Duplicate));

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.entries_for(&RegistrationId::new("reg-a")).len(), 2);
        assert_eq!(ledger.entries_for(&RegistrationId::new("reg-b")).len(), 1);
        assert!(ledger.entries_for(&RegistrationId::new("reg-c")).is_empty());
    }

    #[test]
    fn test_append_is_idempotent_by_entry_id() {
        let ledger = ScanLedger::new();
        let e = entry("reg-a", ScanOutcome::Valid);

        assert!(ledger.append(e.clone()));
        assert!(!ledger.append(e));
        assert_eq!(ledger.len(), 1);
    }
}
