//! Capability traits exposed by the realtime-database service.
//!
//! The bridges only ever talk to the service through these traits. A real
//! SDK binding implements them on its own handle types; [`crate::memory`]
//! provides an in-process implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ServiceError;

use super::snapshot::DataSnapshot;

// ============================================================================
// AsyncOperation: single-result operation
// ============================================================================

/// Outcome of an [`AsyncOperation`]: a possibly-absent value or the
/// service's failure reason.
pub type OperationResult<T> = std::result::Result<Option<T>, ServiceError>;

/// Handler invoked once with the outcome of an operation.
pub type CompletionHandler<T> = Box<dyn FnOnce(OperationResult<T>) + Send>;

/// An operation that resolves exactly once, to success or failure.
///
/// Every handler registered with `on_complete` is invoked exactly once with
/// the outcome, on whatever context the service chooses. A handler
/// registered after resolution is invoked with the stored outcome.
pub trait AsyncOperation: Send + Sync {
    type Output: Send + 'static;

    fn on_complete(&self, handler: CompletionHandler<Self::Output>);
}

/// Type-erased write operation returned by [`DatabaseReference`] writes.
pub type WriteOperation = Arc<dyn AsyncOperation<Output = ()>>;

// ============================================================================
// Listeners
// ============================================================================

/// Identifies one listener registration on a [`Query`].
pub type ListenerId = u64;

/// Receives value notifications for a location.
pub trait ValueEventListener: Send + Sync {
    fn on_data_change(&self, snapshot: DataSnapshot);

    /// The service revoked the registration. No further calls follow.
    fn on_cancelled(&self, error: ServiceError);
}

/// Receives structural notifications for the direct children of a location.
///
/// `previous_sibling_key` is the key of the child ordered immediately
/// before the affected one, `None` when it is first.
pub trait ChildEventListener: Send + Sync {
    fn on_child_added(&self, snapshot: DataSnapshot, previous_sibling_key: Option<String>);
    fn on_child_changed(&self, snapshot: DataSnapshot, previous_sibling_key: Option<String>);
    fn on_child_removed(&self, snapshot: DataSnapshot);
    fn on_child_moved(&self, snapshot: DataSnapshot, previous_sibling_key: Option<String>);

    /// The service revoked the registration. No further calls follow.
    fn on_cancelled(&self, error: ServiceError);
}

// ============================================================================
// Query / DatabaseReference
// ============================================================================

/// A readable location that accepts listener registrations.
pub trait Query: Send + Sync {
    /// Canonical path of the location.
    fn path(&self) -> String;

    /// Deliver the current value once, then drop the registration.
    fn add_single_value_listener(&self, listener: Arc<dyn ValueEventListener>) -> ListenerId;

    /// Deliver the current value, then every change, until removed.
    fn add_value_listener(&self, listener: Arc<dyn ValueEventListener>) -> ListenerId;

    /// Deliver one callback per child mutation, until removed.
    fn add_child_listener(&self, listener: Arc<dyn ChildEventListener>) -> ListenerId;

    /// Remove a registration. Unknown or already-removed ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// A writable location.
pub trait DatabaseReference: Query {
    /// Key of this location within its parent, `None` for the root.
    fn key(&self) -> Option<String>;

    fn child(&self, path: &str) -> crate::error::Result<Arc<dyn DatabaseReference>>;

    /// A new child location under a freshly generated, time-ordered key.
    fn push(&self) -> Arc<dyn DatabaseReference>;

    fn set_value(&self, value: Value) -> WriteOperation;

    /// Write several descendant paths (relative to this location) at once.
    fn update_children(&self, updates: BTreeMap<String, Value>) -> WriteOperation;

    fn remove_value(&self) -> WriteOperation {
        self.set_value(Value::Null)
    }
}
