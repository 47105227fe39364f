//! Mock implementations for testing
//!
//! [`MemoryDatabase`] behaves like the realtime database for the operations
//! the client uses: `set` replaces a whole subtree, `get` returns a subtree,
//! and writing `null` deletes a node along with any parents left empty.

use crate::client::{path_segments, DatabaseClient};
use crate::error::{Result, SensorError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;

/// In-memory hierarchical store
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    root: RwLock<Value>,
    writes: AtomicUsize,
    reads: AtomicUsize,
    failure: Mutex<Option<(u16, String)>>,
}

impl MemoryDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with the given status
    pub fn fail_with<S: Into<String>>(&self, status: u16, message: S) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = Some((status, message.into()));
    }

    /// Stop injecting failures
    pub fn recover(&self) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    /// Number of successful `set` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of successful `get` calls
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Whole tree, for assertions
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }

    fn injected_failure(&self) -> Option<SensorError> {
        self.failure
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .map(|(status, message)| SensorError::remote(*status, message.clone()))
    }
}

fn insert_at(node: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        insert_at(child, rest, value);
    }
}

/// Remove the node at `segments`; returns true when `node` itself became empty
fn remove_at(node: &mut Value, segments: &[&str]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        *node = Value::Null;
        return true;
    };

    if let Value::Object(map) = node {
        let child_empty = match map.get_mut(*first) {
            Some(child) => remove_at(child, rest),
            None => false,
        };
        if child_empty {
            map.remove(*first);
        }
        if map.is_empty() {
            *node = Value::Null;
            return true;
        }
    }
    false
}

#[async_trait]
impl DatabaseClient for MemoryDatabase {
    async fn set(&self, path: &str, value: &Value) -> Result<()> {
        if let Some(err) = self.injected_failure() {
            return Err(err);
        }

        let segments = path_segments(path);
        let mut root = self.root.write().await;
        if value.is_null() {
            remove_at(&mut root, &segments);
        } else {
            insert_at(&mut root, &segments, value.clone());
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Value>> {
        if let Some(err) = self.injected_failure() {
            return Err(err);
        }

        self.reads.fetch_add(1, Ordering::SeqCst);
        let root = self.root.read().await;
        let mut node = &*root;
        for segment in path_segments(path) {
            match node.get(segment) {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }

        Ok(match node {
            Value::Null => None,
            other => Some(other.clone()),
        })
    }
}
