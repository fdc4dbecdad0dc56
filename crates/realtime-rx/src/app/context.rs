//! AppContext: the sample application's data flows, expressed with the
//! bridges.
//!
//! The context is handed its database root and the signed-in user id
//! instead of reaching for process-wide singletons.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde_json::{json, Value};

use crate::error::{RealtimeError, Result};
use crate::query::{
    child_events_as, continuous_list_values, continuous_value_as, single_list_values, single_value,
    ChildEvent, Observed,
};
use crate::service::{DatabaseReference, WriteOperation};
use crate::task::{deferred_from_task_non_null, from_task_non_null, Deferred};

use super::config::AppPaths;
use super::models::{username_from_email, Comment, Post, User};

/// Poll `stream` to its end, surfacing the first error.
async fn drain<S, T>(mut stream: S) -> Result<()>
where
    S: Stream<Item = Result<T>> + Unpin,
{
    while let Some(item) = stream.next().await {
        item?;
    }
    Ok(())
}

async fn await_write(op: WriteOperation) -> Result<()> {
    drain(from_task_non_null(op)).await
}

#[derive(Clone)]
pub struct AppContext {
    root: Arc<dyn DatabaseReference>,
    uid: String,
    paths: AppPaths,
}

impl AppContext {
    pub fn new(root: Arc<dyn DatabaseReference>, uid: impl Into<String>, paths: AppPaths) -> Self {
        Self {
            root,
            uid: uid.into(),
            paths,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    /// `/users/$uid`.
    pub fn user_ref(&self) -> Result<Arc<dyn DatabaseReference>> {
        self.root.child(&format!("{}/{}", self.paths.users, self.uid))
    }

    pub fn post_ref(&self, post_key: &str) -> Result<Arc<dyn DatabaseReference>> {
        self.root.child(&format!("{}/{}", self.paths.posts, post_key))
    }

    pub fn comments_ref(&self, post_key: &str) -> Result<Arc<dyn DatabaseReference>> {
        self.root
            .child(&format!("{}/{}", self.paths.post_comments, post_key))
    }

    /// Profile write for a newly signed-up user.
    ///
    /// Nothing is written until the returned recipe is subscribed, and each
    /// subscription writes again.
    pub fn save_user(&self, email: &str) -> Result<Deferred<()>> {
        let user_ref = self.user_ref()?;
        let value = User::new(username_from_email(email), email).to_value()?;
        Ok(deferred_from_task_non_null(move || {
            user_ref.set_value(value.clone())
        }))
    }

    /// The signed-in user's profile, read once. The photo comes from the
    /// configured `photo_url_field`.
    pub async fn user(&self) -> Result<User> {
        let user_ref = self.user_ref()?;
        let path = user_ref.path();
        let snapshot = match single_value(user_ref).next().await.transpose()? {
            Some(snapshot) if snapshot.exists() => snapshot,
            _ => return Err(RealtimeError::NotFound(path)),
        };
        let mut user: User = snapshot.decode_as()?;
        user.photo_url = snapshot
            .child(&self.paths.photo_url_field)?
            .value()
            .as_str()
            .map(String::from);
        Ok(user)
    }

    /// Write a post under `/posts` and the author's `/user-posts` in one
    /// update. Returns the new post key.
    pub async fn write_new_post(&self, title: &str, body: &str) -> Result<String> {
        let user = self.user().await?;
        let key = self
            .root
            .child(&self.paths.posts)?
            .push()
            .key()
            .ok_or_else(|| RealtimeError::InvalidPath(self.paths.posts.clone()))?;

        let post = Post::new(self.uid.as_str(), user.username, title, body).to_value()?;
        let mut updates: BTreeMap<String, Value> = BTreeMap::new();
        updates.insert(format!("/{}/{}", self.paths.posts, key), post.clone());
        updates.insert(
            format!("/{}/{}/{}", self.paths.user_posts, self.uid, key),
            post,
        );

        await_write(self.root.update_children(updates)).await?;
        tracing::info!(uid = %self.uid, post = %key, "post written");
        Ok(key)
    }

    /// Append a comment by the signed-in user. Returns the comment key.
    pub async fn post_comment(&self, post_key: &str, text: &str) -> Result<String> {
        let user = self.user().await?;
        let comment_ref = self.comments_ref(post_key)?.push();
        let key = comment_ref.key().unwrap_or_default();
        let comment = Comment::new(self.uid.as_str(), user.username, text);
        await_write(comment_ref.set_value(comment.to_value()?)).await?;
        tracing::debug!(post = %post_key, comment = %key, "comment posted");
        Ok(key)
    }

    pub async fn set_photo_url(&self, url: &str) -> Result<()> {
        let field = self.user_ref()?.child(&self.paths.photo_url_field)?;
        await_write(field.set_value(json!(url))).await
    }

    /// A post, then every change to it.
    pub fn watch_post(&self, post_key: &str) -> Result<Observed<Post>> {
        Ok(continuous_value_as(self.post_ref(post_key)?))
    }

    /// Comment additions, changes, removals and moves for a post.
    pub fn watch_comments(&self, post_key: &str) -> Result<Observed<ChildEvent<Comment>>> {
        Ok(child_events_as(self.comments_ref(post_key)?))
    }

    /// The signed-in user's posts, once, in key order.
    pub fn my_posts(&self) -> Result<Observed<Post>> {
        let mine = self
            .root
            .child(&format!("{}/{}", self.paths.user_posts, self.uid))?;
        Ok(single_list_values(mine))
    }

    /// Every post, re-listed on each change under `/posts`.
    pub fn watch_all_posts(&self) -> Result<Observed<Post>> {
        Ok(continuous_list_values(self.root.child(&self.paths.posts)?))
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("root", &self.root.path())
            .field("uid", &self.uid)
            .field("paths", &self.paths)
            .finish()
    }
}
