//! Test fixtures and utilities for consistent test setup
//!
//! Provides credential files signed with a throwaway RSA key, configuration
//! helpers and frozen clocks.

use chrono::{DateTime, TimeZone, Utc};
use firebase_sensor_rust::time::FixedClock;
use firebase_sensor_rust::ClientConfig;
use rstest::*;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// RSA key used only by the test suite
pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");

pub const TEST_CLIENT_EMAIL: &str = "sensor-writer@demo-project.iam.gserviceaccount.com";

/// Service-account key file in a temporary directory
pub struct CredentialFile {
    pub dir: TempDir,
}

impl CredentialFile {
    /// Write a key whose `token_uri` points at `token_uri`
    pub fn write(token_uri: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let key = serde_json::json!({
            "type": "service_account",
            "project_id": "demo-project",
            "private_key_id": "0123456789abcdef",
            "private_key": TEST_PRIVATE_KEY,
            "client_email": TEST_CLIENT_EMAIL,
            "client_id": "100000000000000000000",
            "token_uri": token_uri,
        });
        std::fs::write(
            dir.path().join("service-account.json"),
            serde_json::to_vec_pretty(&key).expect("serialize key"),
        )
        .expect("write key file");
        Self { dir }
    }

    pub fn path(&self) -> std::path::PathBuf {
        self.dir.path().join("service-account.json")
    }
}

/// Client configuration pointing at a mock server
pub fn test_client_config(credential_path: &Path, database_url: &str) -> ClientConfig {
    ClientConfig::new(credential_path, database_url).expect("valid test config")
}

/// 2024-03-05 14:07:33 in Ecuador local time
#[fixture]
pub fn example_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 19, 7, 33).unwrap()
}

pub fn frozen_clock(instant: DateTime<Utc>) -> Arc<FixedClock> {
    Arc::new(FixedClock(instant))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_file_is_loadable() {
        let file = CredentialFile::write("http://127.0.0.1:1/token");
        let key = firebase_sensor_rust::config::credentials::ServiceAccountKey::load(&file.path())
            .unwrap();
        assert_eq!(key.client_email, TEST_CLIENT_EMAIL);
        assert_eq!(key.token_uri, "http://127.0.0.1:1/token");
    }
}
