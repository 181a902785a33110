//! Secret key configuration
//!
//! The signing key is process-wide, immutable after startup, and handed to
//! the codec by value at construction. It is deliberately not serializable
//! and its `Debug` output is redacted so it cannot leak through logs or
//! error chains.

use crate::{Error, Result};
use std::fmt;
use tracing::info;

/// Minimum accepted key length in bytes
///
/// HMAC accepts any key length, but short keys weaken the digest; the
/// portal provisions 32-byte keys.
const MIN_KEY_BYTES: usize = 16;

/// Process-wide credential signing key
#[derive(Clone)]
pub struct SecretKey {
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidKey("key is empty".to_string()));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Create from a hex string (the form keys take in provisioning)
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| Error::InvalidKey(format!("key is not valid hex: {}", e)))?;
        if bytes.len() < MIN_KEY_BYTES {
            return Err(Error::InvalidKey(format!(
                "key is {} bytes, minimum is {}",
                bytes.len(),
                MIN_KEY_BYTES
            )));
        }
        Ok(Self { bytes })
    }

    /// Load from an environment variable holding a hex key
    pub fn from_env(var: &str) -> Result<Self> {
        let value = std::env::var(var)
            .map_err(|_| Error::Config(format!("environment variable {} not set", var)))?;
        let key = Self::from_hex(&value)?;
        info!(var, key_bytes = key.bytes.len(), "Loaded credential signing key");
        Ok(key)
    }

    /// Key material for the MAC
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<redacted, {} bytes>)", self.bytes.len())
    }
}
