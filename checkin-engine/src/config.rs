//! Configuration for the check-in engine

use crate::{Error, Result};
use credential_core::SecretKey;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Environment variable holding the hex signing key
    ///
    /// The key itself never lives in the config file.
    pub secret_key_env: String,

    /// Metrics listen address
    pub metrics_listen_addr: String,

    /// Maximum events accepted per batch issuance call
    ///
    /// Applied to the issuer through
    /// [`CredentialIssuer::with_batch_limit`](crate::CredentialIssuer::with_batch_limit);
    /// events past the cap come back tagged, not issued.
    pub max_batch_events: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "checkin-engine".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            secret_key_env: "GATEPASS_SECRET_KEY".to_string(),
            metrics_listen_addr: "0.0.0.0:9092".to_string(),
            max_batch_events: 20,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load the signing key named by this configuration
    pub fn load_secret_key(&self) -> Result<SecretKey> {
        Ok(SecretKey::from_env(&self.secret_key_env)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.service_name, "checkin-engine");
        assert_eq!(config.secret_key_env, "GATEPASS_SECRET_KEY");
        assert!(config.max_batch_events > 0);
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
            service_name = "checkin-engine"
            service_version = "0.1.0"
            secret_key_env = "TEST_KEY"
            metrics_listen_addr = "127.0.0.1:9092"
            max_batch_events = 5
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.secret_key_env, "TEST_KEY");
        assert_eq!(config.max_batch_events, 5);
    }
}
