//! ChildEvent: one structural change among the children of a location.
//!
//! Emitted by [`super::child_events`] for every add/change/remove/move
//! callback the service delivers, in delivery order.

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::service::DataSnapshot;

/// Which child callback produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildEventKind {
    Added,
    Changed,
    Removed,
    Moved,
}

/// A child mutation carrying the child's value.
///
/// `key` is the child's key and is populated for every kind, `Removed`
/// included; `value` of a `Removed` event is the child's last value.
/// `previous_sibling_key` is the key of the child ordered just before this
/// one (`None` when first, and always `None` for `Removed`).
#[derive(Debug, Clone, PartialEq)]
pub struct ChildEvent<T> {
    pub value: T,
    pub key: Option<String>,
    pub previous_sibling_key: Option<String>,
    pub kind: ChildEventKind,
}

impl<T> ChildEvent<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ChildEvent<U> {
        ChildEvent {
            value: f(self.value),
            key: self.key,
            previous_sibling_key: self.previous_sibling_key,
            kind: self.kind,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<ChildEvent<U>, E> {
        Ok(ChildEvent {
            value: f(self.value)?,
            key: self.key,
            previous_sibling_key: self.previous_sibling_key,
            kind: self.kind,
        })
    }
}

impl ChildEvent<DataSnapshot> {
    pub fn from_snapshot(
        kind: ChildEventKind,
        snapshot: DataSnapshot,
        previous_sibling_key: Option<String>,
    ) -> Self {
        Self {
            key: snapshot.key().map(str::to_string),
            value: snapshot,
            previous_sibling_key,
            kind,
        }
    }

    /// Decode the carried snapshot into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<ChildEvent<T>> {
        self.try_map(|snapshot| snapshot.decode_as())
    }
}
