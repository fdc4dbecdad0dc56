//! AppPaths: where the application keeps its records.

use serde::{Deserialize, Serialize};

/// Top-level locations used by [`super::AppContext`].
///
/// Missing fields take their defaults when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppPaths {
    pub users: String,
    pub posts: String,
    pub user_posts: String,
    pub post_comments: String,
    /// Field of a user record holding the profile photo URL.
    pub photo_url_field: String,
}

impl Default for AppPaths {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            posts: "posts".to_string(),
            user_posts: "user-posts".to_string(),
            post_comments: "post-comments".to_string(),
            photo_url_field: "photo_url".to_string(),
        }
    }
}

impl AppPaths {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
