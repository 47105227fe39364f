//! Sensor reading services
//!
//! The [`SensorDataClient`] facade and the record/path construction it uses.

pub mod record;
pub mod sensor_data;

pub use record::{build_record, storage_path, validate_key, SensorPayload};
pub use sensor_data::SensorDataClient;
