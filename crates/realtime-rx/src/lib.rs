//! Stream bridges over a listener-driven realtime database.
//!
//! [`task`] turns single-result operations into zero-or-one item streams;
//! [`query`] turns value and child listeners into streams that register on
//! first poll and unregister exactly once.

pub mod error;

pub mod app;
pub mod memory;
pub mod query;
pub mod service;
pub mod subscription;
pub mod task;

pub use error::{RealtimeError, Result, ServiceError, ServiceErrorCode};
