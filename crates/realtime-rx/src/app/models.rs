//! Domain records stored in the database.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A user profile at `/users/$uid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            photo_url: None,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A post, stored at `/posts/$key` and `/user-posts/$uid/$key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub uid: String,
    pub author: String,
    pub title: String,
    pub body: String,
    #[serde(default, rename = "starCount")]
    pub star_count: u32,
    #[serde(default)]
    pub stars: BTreeMap<String, bool>,
}

impl Post {
    pub fn new(
        uid: impl Into<String>,
        author: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            author: author.into(),
            title: title.into(),
            body: body.into(),
            star_count: 0,
            stars: BTreeMap::new(),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A comment at `/post-comments/$post/$key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub uid: String,
    pub author: String,
    pub text: String,
}

impl Comment {
    pub fn new(uid: impl Into<String>, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            author: author.into(),
            text: text.into(),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// The part of `email` before `@`, or all of it when there is none.
pub fn username_from_email(email: &str) -> &str {
    match email.split_once('@') {
        Some((name, _)) => name,
        None => email,
    }
}
