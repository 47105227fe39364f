//! Sensor readings for Firebase Realtime Database
//!
//! This crate writes timestamped sensor readings under a date-partitioned
//! path and reads arbitrary paths back, talking to the database over its
//! REST API with a service-account credential.
//!
//! # Features
//!
//! - One connection handle per process, shared explicitly via `Arc`
//! - Paths partitioned by Ecuador local time (fixed UTC-5) to the minute
//! - Overwrite-set semantics: the last reading in a minute wins
//! - OAuth2 access tokens from a service-account key, cached until expiry
//!
//! ```no_run
//! use firebase_sensor_rust::{ClientConfig, SensorDataClient, SensorPayload};
//!
//! # async fn run() -> firebase_sensor_rust::Result<()> {
//! let config = ClientConfig::new(
//!     "/etc/sensor/service-account.json",
//!     "https://my-project-default-rtdb.firebaseio.com",
//! )?;
//! let client = SensorDataClient::connect(&config)?;
//!
//! let path = client
//!     .upload(SensorPayload::new().with("power", 120), "sensor-7", "energia")
//!     .await?;
//! let stored = client.get(&path).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod services;
pub mod time;

// Test support modules - available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-export main types for convenience
pub use client::{DatabaseClient, RealtimeDatabase};
pub use config::ClientConfig;
pub use error::{Result, SensorError};
pub use services::{SensorDataClient, SensorPayload};
