//! Credential signing, encoding and verification
//!
//! This module provides:
//! - HMAC-SHA256 signing over the canonical field order
//! - JSON wire encoding/decoding of the QR payload
//! - Constant-time signature verification

use crate::{
    config::SecretKey,
    types::{CredentialClaims, SignedCredential},
    Error, Result,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Wire fields that must be present on every decoded payload
const REQUIRED_FIELDS: [&str; 4] = ["registration_id", "student_id", "event_id", "signature"];

/// Credential codec
///
/// Holds the process-wide secret key. All issuance paths sign through the
/// same canonicalization, so a credential minted by the batch path verifies
/// identically to one minted singly.
pub struct CredentialCodec {
    key: SecretKey,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec").finish_non_exhaustive()
    }
}

impl CredentialCodec {
    /// Create codec with the process secret key
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }

    /// Sign claims, producing a credential ready for encoding
    pub fn sign(&self, claims: CredentialClaims) -> SignedCredential {
        let signature = self.signature_for(&claims);
        SignedCredential { claims, signature }
    }

    /// Encode a signed credential to its JSON wire form
    pub fn encode(&self, credential: &SignedCredential) -> Result<String> {
        Ok(serde_json::to_string(credential)?)
    }

    /// Decode a raw payload string
    ///
    /// Fails with [`Error::MalformedPayload`] when the input is not a JSON
    /// object, and with [`Error::MissingFields`] naming every absent
    /// required field.
    pub fn decode(raw: &str) -> Result<SignedCredential> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| Error::MalformedPayload(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| Error::MalformedPayload("payload is not a JSON object".to_string()))?;

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| {
                object
                    .get(**field)
                    .and_then(|v| v.as_str())
                    .map(|s| s.is_empty())
                    .unwrap_or(true)
            })
            .map(|field| field.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }

        serde_json::from_value(value).map_err(|e| Error::MalformedPayload(e.to_string()))
    }

    /// Verify a credential's signature against its own fields
    ///
    /// Recomputes the digest from the canonical fields and compares in
    /// constant time. Returns false for signatures that are not valid
    /// lowercase hex rather than erroring, so callers cannot distinguish
    /// encoding garbage from a forged digest.
    pub fn verify(&self, credential: &SignedCredential) -> bool {
        let provided = match hex::decode(&credential.signature) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        let mut mac = self.mac();
        mac.update(credential.claims.canonical_string().as_bytes());
        // verify_slice is constant-time; never compare digests with ==
        mac.verify_slice(&provided).is_ok()
    }

    /// Compute the lowercase hex digest for claims
    fn signature_for(&self, claims: &CredentialClaims) -> String {
        let mut mac = self.mac();
        mac.update(claims.canonical_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.key.as_bytes()).expect("HMAC accepts any key length")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventId, RegistrationId, StudentId};
    use chrono::Utc;

    fn codec() -> CredentialCodec {
        CredentialCodec::new(SecretKey::from_bytes(b"test-secret-key").unwrap())
    }

    fn claims() -> CredentialClaims {
        CredentialClaims {
            registration_id: RegistrationId::generate(),
            student_id: StudentId::new("STU2023001"),
            event_id: EventId::new("evt-hackathon"),
            issued_at: Utc::now(),
            expires_at: Some(Utc::now() + chrono::Duration::hours(8)),
            event_title: Some("Annual Hackathon".to_string()),
            student_name: Some("Priya Sharma".to_string()),
        }
    }

    #[test]
    fn test_sign_encode_decode_verify_roundtrip() {
        let codec = codec();
        let credential = codec.sign(claims());
        let wire = codec.encode(&credential).unwrap();

        let decoded = CredentialCodec::decode(&wire).unwrap();
        assert_eq!(decoded, credential);
        assert!(codec.verify(&decoded));
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        let credential = codec().sign(claims());
        assert_eq!(credential.signature.len(), 64); // SHA-256 digest
        assert!(credential
            .signature
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_single_bit_flip_invalidates_signature() {
        let codec = codec();
        let mut credential = codec.sign(claims());

        let mut bytes = hex::decode(&credential.signature).unwrap();
        bytes[0] ^= 0x01;
        credential.signature = hex::encode(bytes);

        assert!(!codec.verify(&credential));
    }

    #[test]
    fn test_field_mutation_invalidates_signature() {
        let codec = codec();
        let mut credential = codec.sign(claims());
        credential.claims.student_id = StudentId::new("STU2023002");
        assert!(!codec.verify(&credential));
    }

    #[test]
    fn test_display_fields_not_signed() {
        let codec = codec();
        let mut credential = codec.sign(claims());
        credential.claims.event_title = Some("Photoshopped Title".to_string());
        // Display fields are outside the canonical material by design intent
        // of the wire contract; they still verify.
        assert!(codec.verify(&credential));
    }

    #[test]
    fn test_non_hex_signature_verifies_false() {
        let codec = codec();
        let mut credential = codec.sign(claims());
        credential.signature = "not-hex-at-all".to_string();
        assert!(!codec.verify(&credential));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = CredentialCodec::decode("not json {{").unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));

        let err = CredentialCodec::decode("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[test]
    fn test_decode_names_missing_fields() {
        let err = CredentialCodec::decode(r#"{"registration_id": "r-1"}"#).unwrap_err();
        match err {
            Error::MissingFields(fields) => {
                assert_eq!(fields, vec!["student_id", "event_id", "signature"]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_treats_empty_required_field_as_missing() {
        let raw = r#"{"registration_id": "", "student_id": "s", "event_id": "e",
                      "issued_at": "2026-01-01T00:00:00Z", "signature": "ab"}"#;
        let err = CredentialCodec::decode(raw).unwrap_err();
        assert!(matches!(err, Error::MissingFields(fields) if fields == vec!["registration_id"]));
    }

    #[test]
    fn test_different_keys_do_not_cross_verify() {
        let a = CredentialCodec::new(SecretKey::from_bytes(b"key-a").unwrap());
        let b = CredentialCodec::new(SecretKey::from_bytes(b"key-b").unwrap());
        let credential = a.sign(claims());
        assert!(a.verify(&credential));
        assert!(!b.verify(&credential));
    }
}
