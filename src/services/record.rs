//! Sensor reading records and their storage paths

use crate::client::{normalize_path, path_segments};
use crate::error::{Result, SensorError};
use crate::time::{LocalTimestamp, ECUADOR_OFFSET_MINUTES};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Characters the database does not allow inside a key
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

/// Caller-supplied reading: a JSON object of arbitrary fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorPayload(Map<String, Value>);

impl SensorPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for SensorPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Only JSON objects are payloads; null and scalars are rejected
impl TryFrom<Value> for SensorPayload {
    type Error = SensorError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(SensorError::validation("Sensor data is missing")),
            other => Err(SensorError::validation(format!(
                "Sensor data must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check that `value` can be used as a single path segment
pub fn validate_key(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SensorError::validation(format!("{field} must not be empty")));
    }

    if let Some(c) = value
        .chars()
        .find(|c| FORBIDDEN_KEY_CHARS.contains(c) || c.is_ascii_control())
    {
        return Err(SensorError::validation(format!(
            "{field} contains forbidden character {c:?}: {value}"
        )));
    }

    Ok(())
}

/// `{base}/{tipo}/{sensor_id}/{YYYY}/{MM}/{DD}/{HH}/{mm}`
pub fn storage_path(base_path: &str, tipo: &str, sensor_id: &str, at: &LocalTimestamp) -> String {
    let mut segments: Vec<&str> = path_segments(base_path);
    segments.push(tipo);
    segments.push(sensor_id);

    let partition = at.partition_segments();
    segments.extend(partition.iter().map(String::as_str));

    normalize_path(&segments.join("/"))
}

/// Merge the payload with the derived fields; derived fields win on collision
pub fn build_record(
    data: SensorPayload,
    sensor_id: &str,
    tipo: &str,
    at: &LocalTimestamp,
) -> Map<String, Value> {
    let mut record = data.into_inner();

    record.insert("sensorId".into(), sensor_id.into());
    record.insert("tipo".into(), tipo.into());
    record.insert("timestamp".into(), at.local_iso().into());
    record.insert("timestampUTC".into(), at.utc_iso().into());
    record.insert("timestamp_unix_ms".into(), at.unix_millis().into());
    record.insert("timezone_offset_min".into(), ECUADOR_OFFSET_MINUTES.into());
    record.insert("year_local".into(), at.year().into());
    record.insert("month_local".into(), at.month().into());
    record.insert("day_local".into(), at.day().into());
    record.insert("hour_local".into(), at.hour().into());
    record.insert("minute_local".into(), at.minute().into());
    record.insert("second_local".into(), at.second().into());

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn sample_time() -> LocalTimestamp {
        LocalTimestamp::from_utc(Utc.with_ymd_and_hms(2024, 3, 5, 19, 7, 33).unwrap())
    }

    #[test]
    fn test_storage_path_example() {
        let path = storage_path("/lecturas", "energia", "sensor-7", &sample_time());
        assert_eq!(path, "/lecturas/energia/sensor-7/2024/03/05/14/07");
    }

    #[rstest]
    #[case("/lecturas", "/lecturas/luz/s1/2024/03/05/14/07")]
    #[case("lecturas/", "/lecturas/luz/s1/2024/03/05/14/07")]
    #[case("/planta/norte/", "/planta/norte/luz/s1/2024/03/05/14/07")]
    #[case("", "/luz/s1/2024/03/05/14/07")]
    fn test_storage_path_normalizes_base(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(storage_path(base, "luz", "s1", &sample_time()), expected);
    }

    #[test]
    fn test_record_contains_payload_and_derived_fields() {
        let data = SensorPayload::new().with("power", 120).with("unit", "W");
        let record = build_record(data, "sensor-7", "energia", &sample_time());

        assert_eq!(
            Value::Object(record),
            json!({
                "power": 120,
                "unit": "W",
                "sensorId": "sensor-7",
                "tipo": "energia",
                "timestamp": "2024-03-05T14:07:33-05:00",
                "timestampUTC": "2024-03-05T19:07:33.000Z",
                "timestamp_unix_ms": 1_709_665_653_000_i64,
                "timezone_offset_min": -300,
                "year_local": 2024,
                "month_local": 3,
                "day_local": 5,
                "hour_local": 14,
                "minute_local": 7,
                "second_local": 33,
            })
        );
    }

    #[test]
    fn test_derived_fields_win_on_collision() {
        let data = SensorPayload::new()
            .with("sensorId", "spoofed")
            .with("timestamp", "yesterday")
            .with("lux", 300);
        let record = build_record(data, "s1", "luminosidad", &sample_time());

        assert_eq!(record["sensorId"], json!("s1"));
        assert_eq!(record["timestamp"], json!("2024-03-05T14:07:33-05:00"));
        assert_eq!(record["lux"], json!(300));
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!(42))]
    #[case(json!("power=120"))]
    #[case(json!([1, 2, 3]))]
    fn test_non_object_payloads_are_rejected(#[case] value: Value) {
        let err = SensorPayload::try_from(value).unwrap_err();
        assert!(matches!(err, SensorError::Validation(_)));
    }

    #[test]
    fn test_nested_payload_is_accepted() {
        let payload = SensorPayload::try_from(json!({"fase": {"a": 1.5, "b": 1.2}, "ok": true}))
            .unwrap();
        assert_eq!(payload.len(), 2);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("a/b")]
    #[case("a.b")]
    #[case("x#1")]
    #[case("$root")]
    #[case("list[0]")]
    #[case("line\nbreak")]
    fn test_invalid_keys(#[case] value: &str) {
        assert!(validate_key("sensorId", value).is_err());
    }

    #[test]
    fn test_valid_keys() {
        assert!(validate_key("sensorId", "sensor-7").is_ok());
        assert!(validate_key("tipo", "energía_solar").is_ok());
    }
}
