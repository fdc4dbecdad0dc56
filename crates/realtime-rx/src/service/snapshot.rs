//! DataSnapshot: an immutable point-in-time view of one database location.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RealtimeError, Result};

use super::path;

/// The data at a location, as delivered by the service.
///
/// A missing location is represented by `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSnapshot {
    path: String,
    value: Value,
}

impl DataSnapshot {
    /// Build a snapshot for the canonical `path`.
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    /// Canonical path of the location (`/` for the root).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Key of the location within its parent, `None` for the root.
    pub fn key(&self) -> Option<&str> {
        path::last_segment(&self.path)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn exists(&self) -> bool {
        !self.value.is_null()
    }

    /// Decode the value into `T`.
    ///
    /// A missing location decodes as JSON `null`, so `Option<T>` targets
    /// yield `None` while struct targets fail.
    pub fn decode_as<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.value).map_err(|source| RealtimeError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Snapshot of a descendant location.
    pub fn child(&self, child_path: &str) -> Result<DataSnapshot> {
        let mut value = &self.value;
        for seg in path::segments(child_path)? {
            value = match value {
                Value::Object(map) => map.get(&seg).unwrap_or(&Value::Null),
                Value::Array(items) => seg
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i))
                    .unwrap_or(&Value::Null),
                _ => &Value::Null,
            };
        }
        Ok(DataSnapshot::new(
            path::join(&self.path, child_path)?,
            value.clone(),
        ))
    }

    /// Direct children in the order the service delivered them.
    ///
    /// Scalars and missing locations have no children. Array elements are
    /// keyed by index; `null` elements are skipped.
    pub fn children(&self) -> Vec<DataSnapshot> {
        let base = self.path.trim_end_matches('/');
        match &self.value {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| DataSnapshot::new(format!("{base}/{k}"), v.clone()))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| DataSnapshot::new(format!("{base}/{i}"), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn children_count(&self) -> usize {
        match &self.value {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.iter().filter(|v| !v.is_null()).count(),
            _ => 0,
        }
    }

    pub fn has_children(&self) -> bool {
        self.children_count() > 0
    }
}
