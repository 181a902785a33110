//! Core types for the credential engine
//!
//! All identifiers are opaque string newtypes so a registration id can never
//! be passed where a student id is expected. Timestamps are ISO-8601 on the
//! wire via chrono's serde support.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque registration token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(String);

impl RegistrationId {
    /// Create from an existing token
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh token (UUIDv4, 128-bit entropy)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Student identifier (roll number, directory id, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(String);

impl StudentId {
    /// Create new student ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    /// Create new event ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unsigned credential fields
///
/// The display fields (`event_title`, `student_name`) are carried for the
/// scanner UI only. They are excluded from the canonical signing material
/// and must never be used for authorization decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Registration this credential proves
    pub registration_id: RegistrationId,

    /// Student the credential was issued to
    pub student_id: StudentId,

    /// Event the credential admits to
    pub event_id: EventId,

    /// Issuance timestamp
    pub issued_at: DateTime<Utc>,

    /// Expiry, bound to the event's end time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Display-only event title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,

    /// Display-only student name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
}

impl CredentialClaims {
    /// Canonical signing material
    ///
    /// Field order is fixed: registration_id, student_id, event_id,
    /// issued_at. Reordering breaks verification of every credential already
    /// issued, so encode and verify both go through this one function.
    pub fn canonical_string(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            self.registration_id,
            self.student_id,
            self.event_id,
            self.issued_at.to_rfc3339_opts(SecondsFormat::Micros, true)
        )
    }
}

/// Signed credential (the QR payload)
///
/// Immutable once signed. The wire form is a single flat JSON object with
/// the claims fields plus `signature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedCredential {
    /// Credential fields
    #[serde(flatten)]
    pub claims: CredentialClaims,

    /// Lowercase hex HMAC-SHA256 digest over the canonical fields
    pub signature: String,
}

impl SignedCredential {
    /// Registration this credential proves
    pub fn registration_id(&self) -> &RegistrationId {
        &self.claims.registration_id
    }

    /// Student the credential was issued to
    pub fn student_id(&self) -> &StudentId {
        &self.claims.student_id
    }

    /// Event the credential admits to
    pub fn event_id(&self) -> &EventId {
        &self.claims.event_id
    }

    /// Whether the credential has expired at `now`
    ///
    /// Credentials without an expiry never expire; the issuer always sets
    /// one, so this only applies to externally produced payloads.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.claims.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> CredentialClaims {
        CredentialClaims {
            registration_id: RegistrationId::new("reg-1"),
            student_id: StudentId::new("stu-1"),
            event_id: EventId::new("evt-1"),
            issued_at: Utc::now(),
            expires_at: None,
            event_title: Some("Tech Fest".to_string()),
            student_name: Some("A. Student".to_string()),
        }
    }

    #[test]
    fn test_registration_id_generate_unique() {
        let a = RegistrationId::generate();
        let b = RegistrationId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36); // hyphenated UUID
    }

    #[test]
    fn test_canonical_string_ignores_display_fields() {
        let mut c = claims();
        let before = c.canonical_string();
        c.event_title = Some("Renamed".to_string());
        c.student_name = None;
        assert_eq!(before, c.canonical_string());
    }

    #[test]
    fn test_canonical_string_changes_with_core_fields() {
        let mut c = claims();
        let before = c.canonical_string();
        c.event_id = EventId::new("evt-2");
        assert_ne!(before, c.canonical_string());
    }

    #[test]
    fn test_expiry_check() {
        let mut c = claims();
        c.expires_at = Some(Utc::now() - chrono::Duration::minutes(5));
        let credential = SignedCredential {
            claims: c,
            signature: "00".to_string(),
        };
        assert!(credential.is_expired(Utc::now()));

        let credential = SignedCredential {
            claims: claims(),
            signature: "00".to_string(),
        };
        assert!(!credential.is_expired(Utc::now()));
    }
}
