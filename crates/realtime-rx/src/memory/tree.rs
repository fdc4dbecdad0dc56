//! JSON tree storage for the in-memory database.
//!
//! The stored tree is always normalized: no `null` leaves, no empty objects,
//! arrays stored as index-keyed objects, and object keys kept in service key
//! order (integer-like keys first, numerically; then the rest,
//! lexicographically).

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// Service key order.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (parse_index(a), parse_index(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn parse_index(key: &str) -> Option<i64> {
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse::<i32>().ok().map(i64::from)
}

fn sort_map(map: &mut Map<String, Value>) {
    let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
    entries.sort_by(|a, b| compare_keys(&a.0, &b.0));
    *map = entries.into_iter().collect();
}

/// Normalize a value written by a client.
pub fn normalize(value: Value) -> Value {
    let map: Map<String, Value> = match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| (k, normalize(v)))
            .filter(|(_, v)| !v.is_null())
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), normalize(v)))
            .filter(|(_, v)| !v.is_null())
            .collect(),
        scalar => return scalar,
    };
    if map.is_empty() {
        return Value::Null;
    }
    let mut map = map;
    sort_map(&mut map);
    Value::Object(map)
}

/// The value at `path`, `Null` when absent.
pub fn get<'a>(root: &'a Value, path: &[String]) -> &'a Value {
    static NULL: Value = Value::Null;
    let mut node = root;
    for seg in path {
        match node.get(seg) {
            Some(child) => node = child,
            None => return &NULL,
        }
    }
    node
}

/// Replace the value at `path` with the already-normalized `value`,
/// creating intermediate objects and pruning ones left empty.
pub fn set(node: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let inserted = !map.contains_key(head);
        let child = map.entry(head.clone()).or_insert(Value::Null);
        set(child, rest, value);
        if child.is_null() {
            map.remove(head);
        } else if inserted {
            sort_map(map);
        }
        if map.is_empty() {
            *node = Value::Null;
        }
    }
}

/// Direct children of a stored value, in key order.
pub fn children(value: &Value) -> Vec<(&str, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        _ => Vec::new(),
    }
}
