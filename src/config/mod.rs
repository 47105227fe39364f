//! Configuration management for the sensor data client

pub mod credentials;

use crate::error::{Result, SensorError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Root path under which readings are stored when the caller gives none
pub const DEFAULT_BASE_PATH: &str = "/lecturas";

/// Prefix of the environment variables read by [`ClientConfig::load`]
pub const ENV_PREFIX: &str = "SENSOR";

/// Connection settings for the realtime database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Path to the service-account key file
    pub credential_path: PathBuf,

    /// Database URL (e.g., "https://my-project-default-rtdb.firebaseio.com")
    pub database_url: Url,

    /// Default root for sensor readings
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,

    /// Refresh the access token this long before it expires
    #[serde(with = "humantime_serde", default = "default_token_refresh_margin")]
    pub token_refresh_margin: Duration,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_token_refresh_margin() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    format!("firebase-sensor-rust/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Create a config from a credential path and database URL, defaults elsewhere
    pub fn new(credential_path: impl Into<PathBuf>, database_url: &str) -> Result<Self> {
        let database_url = Url::parse(database_url).map_err(|e| {
            SensorError::configuration(format!("Invalid database URL '{database_url}': {e}"))
        })?;

        let config = Self {
            credential_path: credential_path.into(),
            database_url,
            base_path: default_base_path(),
            timeout: default_timeout(),
            token_refresh_margin: default_token_refresh_margin(),
            user_agent: default_user_agent(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional TOML file, then `SENSOR_*` environment variables.
    ///
    /// Environment variables override file values: `SENSOR_CREDENTIAL_PATH`,
    /// `SENSOR_DATABASE_URL`, `SENSOR_BASE_PATH`, `SENSOR_TIMEOUT`,
    /// `SENSOR_TOKEN_REFRESH_MARGIN`, `SENSOR_USER_AGENT`.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("base_path", DEFAULT_BASE_PATH)
            .and_then(|b| b.set_default("timeout", "30s"))
            .and_then(|b| b.set_default("token_refresh_margin", "60s"))
            .and_then(|b| b.set_default("user_agent", default_user_agent()))
            .map_err(|e| SensorError::configuration(format!("Invalid defaults: {e}")))?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(false))
            .build()
            .map_err(|e| SensorError::configuration(format!("Failed to read configuration: {e}")))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| SensorError::configuration(format!("Invalid configuration: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot express
    pub fn validate(&self) -> Result<()> {
        match self.database_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(SensorError::configuration(format!(
                    "Database URL must use http or https, got '{other}'"
                )))
            }
        }

        if self.database_url.host_str().is_none() {
            return Err(SensorError::configuration("Database URL has no host"));
        }

        if self.timeout.is_zero() {
            return Err(SensorError::configuration("Timeout must be greater than zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config =
            ClientConfig::new("/tmp/key.json", "https://demo-default-rtdb.firebaseio.com").unwrap();
        assert_eq!(config.base_path, "/lecturas");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.token_refresh_margin, Duration::from_secs(60));
        assert!(config.user_agent.starts_with("firebase-sensor-rust/"));
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        let err = ClientConfig::new("/tmp/key.json", "not a url").unwrap_err();
        assert!(matches!(err, SensorError::Configuration(_)));

        let err = ClientConfig::new("/tmp/key.json", "ftp://example.com").unwrap_err();
        assert!(matches!(err, SensorError::Configuration(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config =
            ClientConfig::new("/tmp/key.json", "https://demo.firebaseio.com").unwrap();
        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensor.toml");
        std::fs::write(
            &path,
            r#"
credential_path = "/etc/sensor/key.json"
database_url = "https://demo.firebaseio.com"
base_path = "/pruebas"
timeout = "5s"
"#,
        )
        .unwrap();

        let config = temp_env::with_vars_unset(
            [
                "SENSOR_CREDENTIAL_PATH",
                "SENSOR_DATABASE_URL",
                "SENSOR_BASE_PATH",
                "SENSOR_TIMEOUT",
            ],
            || ClientConfig::load(Some(&path)),
        )
        .unwrap();

        assert_eq!(config.credential_path, PathBuf::from("/etc/sensor/key.json"));
        assert_eq!(config.base_path, "/pruebas");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.token_refresh_margin, Duration::from_secs(60));
    }
}
