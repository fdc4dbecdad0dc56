//! In-memory realtime database.
//!
//! # Overview
//!
//! [`MemoryDatabase`] implements the service capability traits over a JSON
//! tree so the bridges and the application layer can run without a remote
//! service. It supports value and child listeners, push keys, multi-path
//! updates, and simulated listener revocation and access denial.
//!
//! # Modules
//!
//! - [`database`]: [`MemoryDatabase`], [`MemoryRef`] and options.
//! - [`registry`]: the listener table.
//! - [`tree`]: normalized JSON tree operations and key order.
//! - [`push_id`]: chronologically sortable push keys.

pub mod database;
pub mod push_id;
pub mod registry;
pub mod tree;

pub use database::{DeliveryMode, MemoryDatabase, MemoryDatabaseOptions, MemoryRef};
pub use push_id::PushIdGenerator;
