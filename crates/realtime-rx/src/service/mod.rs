//! Service capability layer: the surface of the external realtime database.
//!
//! - [`traits`]: [`AsyncOperation`], [`Query`], [`DatabaseReference`] and
//!   the listener traits.
//! - [`snapshot`]: [`DataSnapshot`] with serde-backed decoding.
//! - [`path`]: path validation and joining.

pub mod path;
pub mod snapshot;
pub mod traits;

pub use snapshot::DataSnapshot;
pub use traits::{
    AsyncOperation, ChildEventListener, CompletionHandler, DatabaseReference, ListenerId,
    OperationResult, Query, ValueEventListener, WriteOperation,
};
