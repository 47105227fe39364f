//! Sensor data facade
//!
//! [`SensorDataClient`] validates a reading, stamps it with the current
//! local time and writes it to its date-partitioned path.

use crate::client::{normalize_path, DatabaseClient, RealtimeDatabase};
use crate::config::{ClientConfig, DEFAULT_BASE_PATH};
use crate::error::{Result, SensorError};
use crate::services::record::{build_record, storage_path, validate_key, SensorPayload};
use crate::time::{Clock, LocalTimestamp, SystemClock};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Writes and reads sensor readings through one shared connection handle
#[derive(Clone)]
pub struct SensorDataClient {
    db: Arc<dyn DatabaseClient>,
    clock: Arc<dyn Clock>,
    base_path: String,
}

impl SensorDataClient {
    /// Open a connection from configuration.
    ///
    /// Fails with a configuration error when the credential file does not
    /// exist, whatever the database URL.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let db = RealtimeDatabase::connect(config)?;
        info!("Sensor data client ready, base path {}", config.base_path);
        Ok(Self::new(Arc::new(db)).with_base_path(config.base_path.clone()))
    }

    /// Wrap an existing connection handle
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the default base path
    pub fn with_base_path<S: Into<String>>(mut self, base_path: S) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Default base path used by [`Self::upload`]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Upload a reading under the default base path
    pub async fn upload(&self, data: SensorPayload, sensor_id: &str, tipo: &str) -> Result<String> {
        self.upload_sensor_data(data, sensor_id, tipo, None).await
    }

    /// Upload an arbitrary JSON value; anything but an object is rejected
    pub async fn upload_value(
        &self,
        data: Value,
        sensor_id: &str,
        tipo: &str,
        base_path: Option<&str>,
    ) -> Result<String> {
        let payload = SensorPayload::try_from(data)?;
        self.upload_sensor_data(payload, sensor_id, tipo, base_path)
            .await
    }

    /// Write a reading to `{base}/{tipo}/{sensor_id}/{YYYY}/{MM}/{DD}/{HH}/{mm}`.
    ///
    /// The previous value at that path, if any, is replaced. Returns the path
    /// written.
    pub async fn upload_sensor_data(
        &self,
        data: SensorPayload,
        sensor_id: &str,
        tipo: &str,
        base_path: Option<&str>,
    ) -> Result<String> {
        validate_key("sensorId", sensor_id)?;
        validate_key("tipo", tipo)?;

        let at = LocalTimestamp::now(self.clock.as_ref());
        let base = base_path.unwrap_or(&self.base_path);
        let path = storage_path(base, tipo, sensor_id, &at);
        let record = Value::Object(build_record(data, sensor_id, tipo, &at));

        debug!("Uploading {tipo} reading from {sensor_id} to {path}");

        self.db
            .set(&path, &record)
            .await
            .map_err(|e| SensorError::upload(path.clone(), e))?;

        Ok(path)
    }

    /// Read whatever is stored at `path`; `None` when nothing is there
    pub async fn get(&self, path: &str) -> Result<Option<Value>> {
        debug!("Reading {}", normalize_path(path));

        self.db
            .get(path)
            .await
            .map_err(|e| SensorError::read(normalize_path(path), e))
    }
}

impl std::fmt::Debug for SensorDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorDataClient")
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}
