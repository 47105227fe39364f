//! Service-account key loading

use crate::error::{Result, SensorError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Default OAuth2 token endpoint used when the key file omits `token_uri`
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Service-account key as downloaded from the cloud console
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    /// Key type, always "service_account"
    #[serde(rename = "type")]
    pub key_type: String,

    /// Project the account belongs to
    #[serde(default)]
    pub project_id: Option<String>,

    /// Identifier of the signing key
    #[serde(default)]
    pub private_key_id: Option<String>,

    /// PEM-encoded RSA private key
    pub private_key: String,

    /// Account email, used as JWT issuer
    pub client_email: String,

    /// OAuth2 token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

// Keep the private key out of logs.
impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read and validate a key file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SensorError::configuration(format!(
                "Credential file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            SensorError::configuration(format!(
                "Failed to read credential file {}: {e}",
                path.display()
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate a key from its JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(content).map_err(|e| {
            SensorError::configuration(format!("Failed to parse credential file: {e}"))
        })?;
        key.validate()?;
        Ok(key)
    }

    fn validate(&self) -> Result<()> {
        if self.key_type != "service_account" {
            return Err(SensorError::configuration(format!(
                "Unsupported credential type '{}', expected 'service_account'",
                self.key_type
            )));
        }
        if self.client_email.trim().is_empty() {
            return Err(SensorError::configuration("Credential has empty client_email"));
        }
        if !self.private_key.contains("PRIVATE KEY") {
            return Err(SensorError::configuration(
                "Credential private_key is not a PEM private key",
            ));
        }
        Ok(())
    }
}
