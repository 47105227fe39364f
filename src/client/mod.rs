//! Realtime database client abstraction
//!
//! [`DatabaseClient`] is the seam between the sensor facade and the remote
//! store. [`realtime::RealtimeDatabase`] talks to the REST API; the `mock`
//! module provides an in-memory store for tests.

pub mod realtime;

pub use realtime::RealtimeDatabase;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Hierarchical key-value store addressed by slash-separated paths
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Replace the whole value at `path` (no merge with the previous value)
    async fn set(&self, path: &str, value: &Value) -> Result<()>;

    /// Fetch the value at `path`, `None` when nothing is stored there
    async fn get(&self, path: &str) -> Result<Option<Value>>;
}

/// Split a path into its non-empty segments.
///
/// Leading, trailing and repeated slashes are ignored, so `"/a//b/"` and
/// `"a/b"` address the same node. An empty result is the database root.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Canonical form of a path: one leading slash, no trailing slash
pub fn normalize_path(path: &str) -> String {
    let segments = path_segments(path);
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}
