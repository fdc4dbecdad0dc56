//! ListenerRegistry: the in-memory database's listener table.
//!
//! Registrations are stored as `Arc`s so that a notification batch can be
//! built from a snapshot of the table. Snapshot-on-write semantics mean:
//!   - A listener removed *after* a batch was built still receives that
//!     batch (the bridge's active guard drops it).
//!   - A listener added *after* a batch was built does not see it.
//!
//! The registry is owned by the database tree and guarded by the same lock,
//! so registration, removal and batch construction are atomic with respect
//! to writes.

use std::sync::Arc;

use crate::service::{ChildEventListener, ListenerId, ValueEventListener};

/// The callback side of one registration.
#[derive(Clone)]
pub enum Registered {
    Value(Arc<dyn ValueEventListener>),
    Child(Arc<dyn ChildEventListener>),
}

/// One persistent registration at a path.
#[derive(Clone)]
pub struct Registration {
    pub id: ListenerId,
    pub path: Vec<String>,
    pub listener: Registered,
}

impl Registration {
    /// `true` if a write at `path` can change what this listener observes.
    pub fn overlaps(&self, path: &[String]) -> bool {
        self.path.starts_with(path) || path.starts_with(&self.path)
    }

    /// `true` if this registration sits at or below `path`.
    pub fn is_within(&self, path: &[String]) -> bool {
        self.path.starts_with(path)
    }
}

pub struct ListenerRegistry {
    entries: Vec<Arc<Registration>>,
    next_id: ListenerId,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserve an id without registering anything (one-time listeners).
    pub fn allocate(&mut self) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Register `listener` at `path` and return its id.
    pub fn on(&mut self, path: Vec<String>, listener: Registered) -> ListenerId {
        let id = self.allocate();
        self.entries.push(Arc::new(Registration { id, path, listener }));
        id
    }

    /// Remove the registration identified by `id`.
    ///
    /// Returns whether anything was removed; safe to call multiple times.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|r| r.id != id);
        self.entries.len() != before
    }

    /// Registrations affected by a write at any of `paths`, in registration
    /// order.
    pub fn affected_by(&self, paths: &[Vec<String>]) -> Vec<Arc<Registration>> {
        self.entries
            .iter()
            .filter(|r| paths.iter().any(|p| r.overlaps(p)))
            .cloned()
            .collect()
    }

    /// Remove and return every registration at or below `path`.
    pub fn drain_within(&mut self, path: &[String]) -> Vec<Arc<Registration>> {
        let (drained, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|r| r.is_within(path));
        self.entries = kept;
        drained
    }

    /// Number of currently registered listeners.
    pub fn size(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
