//! Sample application layer built on the bridges.
//!
//! - [`models`]: `User`, `Post`, `Comment` and [`username_from_email`].
//! - [`config`]: [`AppPaths`], the record locations.
//! - [`context`]: [`AppContext`], sign-up, posting, commenting and watch
//!   flows for one signed-in user.
//! - [`keyed_list`]: [`KeyedList`], an ordered view maintained from child
//!   events.

pub mod config;
pub mod context;
pub mod keyed_list;
pub mod models;

pub use config::AppPaths;
pub use context::AppContext;
pub use keyed_list::{KeyedList, ListChange};
pub use models::{username_from_email, Comment, Post, User};

/// The comment list shown under a post.
pub type CommentList = KeyedList<Comment>;
