//! Database path helpers.
//!
//! Paths are `/`-separated key sequences. Leading, trailing and repeated
//! separators are ignored, so `"/users//u1/"` and `"users/u1"` name the same
//! location. The root is the empty path.

use crate::error::{RealtimeError, Result};

/// Characters the service refuses inside a key.
const FORBIDDEN: &[char] = &['.', '#', '$', '[', ']'];

/// Split `path` into validated segments.
pub fn segments(path: &str) -> Result<Vec<String>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.contains(FORBIDDEN) || s.chars().any(char::is_control) {
                Err(RealtimeError::InvalidPath(path.to_string()))
            } else {
                Ok(s.to_string())
            }
        })
        .collect()
}

/// Canonical form of `segments`: `/a/b`, or `/` for the root.
pub fn canonical(segments: &[String]) -> String {
    if segments.is_empty() {
        "/".to_string()
    } else {
        segments.iter().fold(String::new(), |mut out, s| {
            out.push('/');
            out.push_str(s);
            out
        })
    }
}

/// Join a child path onto a canonical parent path.
pub fn join(parent: &str, child: &str) -> Result<String> {
    let mut all = segments(parent)?;
    all.extend(segments(child)?);
    Ok(canonical(&all))
}

/// Last segment of a canonical path, `None` for the root.
pub fn last_segment(path: &str) -> Option<&str> {
    path.rsplit('/').find(|s| !s.is_empty())
}
