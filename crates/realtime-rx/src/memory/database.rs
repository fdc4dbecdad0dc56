//! MemoryDatabase: an in-process realtime database.
//!
//! Implements [`Query`] and [`DatabaseReference`] over a normalized JSON tree.
//! Value listeners receive the current value on registration and again after
//! every write that changes it. Child listeners receive one `added` per
//! existing child on registration, then `removed`/`added`/`changed` callbacks
//! per write. Children are kept in key order, so a child never moves.
//!
//! # Threading model
//!
//! One `parking_lot::Mutex` guards the tree, the listener registry and the
//! access rules. Notification batches are built under the lock from a
//! snapshot of the registry and queued while the lock is still held, so
//! batches keep write order. With [`DeliveryMode::Inline`] the queue is
//! drained after the lock is released by whichever caller gets there first;
//! a write made from inside a callback only appends. With
//! [`DeliveryMode::Spawned`] the queue feeds a single delivery task.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Result, ServiceError, ServiceErrorCode};
use crate::service::{
    path, ChildEventListener, DataSnapshot, DatabaseReference, ListenerId, Query,
    ValueEventListener, WriteOperation,
};
use crate::task::OperationSource;

use super::push_id::PushIdGenerator;
use super::registry::{ListenerRegistry, Registered, Registration};
use super::tree;

// ============================================================================
// Options
// ============================================================================

/// Where listener callbacks run.
#[derive(Debug, Clone, Default)]
pub enum DeliveryMode {
    /// On the thread that performed the write or registration.
    #[default]
    Inline,
    /// On a delivery task spawned on the given runtime, in write order.
    Spawned(tokio::runtime::Handle),
}

/// Configuration for [`MemoryDatabase`].
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabaseOptions {
    pub delivery: DeliveryMode,
    /// Initial contents of the database (normalized on load).
    pub seed: Value,
}

// ============================================================================
// Delivery
// ============================================================================

type Notification = Box<dyn FnOnce() + Send>;

/// Inline notifications waiting to run. One caller drains at a time, so a
/// write made from inside a callback is appended behind the batch that is
/// running instead of overtaking it.
#[derive(Default)]
struct InlineQueue {
    pending: VecDeque<Notification>,
    draining: bool,
}

enum Dispatcher {
    Inline(Mutex<InlineQueue>),
    Spawned(mpsc::UnboundedSender<Notification>),
}

impl Dispatcher {
    fn new(mode: DeliveryMode) -> Self {
        match mode {
            DeliveryMode::Inline => Self::Inline(Mutex::new(InlineQueue::default())),
            DeliveryMode::Spawned(handle) => {
                let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();
                handle.spawn(async move {
                    while let Some(notification) = rx.recv().await {
                        notification();
                    }
                });
                Self::Spawned(tx)
            }
        }
    }

    /// Called under the tree lock, so batches keep write order.
    fn enqueue(&self, batch: Vec<Notification>) {
        match self {
            Self::Inline(queue) => queue.lock().pending.extend(batch),
            Self::Spawned(tx) => {
                for notification in batch {
                    if tx.send(notification).is_err() {
                        tracing::trace!("delivery task stopped, dropping notifications");
                        break;
                    }
                }
            }
        }
    }

    /// Called after the tree lock is released. Runs queued inline
    /// notifications unless another caller up the stack (or on another
    /// thread) is already running them.
    fn flush(&self) {
        let Self::Inline(queue) = self else { return };
        {
            let mut q = queue.lock();
            if q.draining {
                return;
            }
            q.draining = true;
        }
        loop {
            let next = {
                let mut q = queue.lock();
                match q.pending.pop_front() {
                    Some(notification) => notification,
                    None => {
                        q.draining = false;
                        return;
                    }
                }
            };
            next();
        }
    }
}

// ============================================================================
// Shared state
// ============================================================================

struct Tree {
    root: Value,
    registry: ListenerRegistry,
    read_denied: Vec<Vec<String>>,
    write_denied: Vec<Vec<String>>,
}

impl Tree {
    fn is_read_denied(&self, path: &[String]) -> bool {
        self.read_denied.iter().any(|rule| path.starts_with(rule))
    }

    fn is_write_denied(&self, path: &[String]) -> bool {
        self.write_denied.iter().any(|rule| path.starts_with(rule))
    }
}

struct Inner {
    tree: Mutex<Tree>,
    dispatcher: Dispatcher,
    push_ids: Mutex<PushIdGenerator>,
}

fn child_path(parent: &str, key: &str) -> String {
    format!("{}/{key}", parent.trim_end_matches('/'))
}

fn cancel(listener: &Registered, error: ServiceError) -> Notification {
    match listener {
        Registered::Value(l) => {
            let l = Arc::clone(l);
            Box::new(move || l.on_cancelled(error))
        }
        Registered::Child(l) => {
            let l = Arc::clone(l);
            Box::new(move || l.on_cancelled(error))
        }
    }
}

/// One `added` per existing child, in key order.
fn initial_children(
    listener: &Arc<dyn ChildEventListener>,
    path: &str,
    current: &Value,
) -> Vec<Notification> {
    let mut out: Vec<Notification> = Vec::new();
    let mut previous: Option<String> = None;
    for (key, value) in tree::children(current) {
        let l = Arc::clone(listener);
        let snapshot = DataSnapshot::new(child_path(path, key), value.clone());
        let prev = previous.replace(key.to_string());
        out.push(Box::new(move || l.on_child_added(snapshot, prev)));
    }
    out
}

/// Child callbacks turning `old` into `new`: removals first, then additions
/// and changes in key order.
fn child_diff(
    listener: &Arc<dyn ChildEventListener>,
    path: &str,
    old: &Value,
    new: &Value,
) -> Vec<Notification> {
    let mut out: Vec<Notification> = Vec::new();
    for (key, value) in tree::children(old) {
        if new.get(key).is_none() {
            let l = Arc::clone(listener);
            let snapshot = DataSnapshot::new(child_path(path, key), value.clone());
            out.push(Box::new(move || l.on_child_removed(snapshot)));
        }
    }
    let mut previous: Option<String> = None;
    for (key, value) in tree::children(new) {
        let prev = previous.replace(key.to_string());
        let changed = match old.get(key) {
            None => Some(false),
            Some(before) if before != value => Some(true),
            Some(_) => None,
        };
        let Some(changed) = changed else { continue };
        let l = Arc::clone(listener);
        let snapshot = DataSnapshot::new(child_path(path, key), value.clone());
        if changed {
            out.push(Box::new(move || l.on_child_changed(snapshot, prev)));
        } else {
            out.push(Box::new(move || l.on_child_added(snapshot, prev)));
        }
    }
    out
}

/// Child events for every affected child listener, then value events.
fn notifications(
    root: &Value,
    affected: &[Arc<Registration>],
    before: &[Value],
) -> Vec<Notification> {
    let mut child_batch: Vec<Notification> = Vec::new();
    let mut value_batch: Vec<Notification> = Vec::new();
    for (reg, old) in affected.iter().zip(before) {
        let new = tree::get(root, &reg.path);
        if new == old {
            continue;
        }
        let path = path::canonical(&reg.path);
        match &reg.listener {
            Registered::Value(l) => {
                let l = Arc::clone(l);
                let snapshot = DataSnapshot::new(path, new.clone());
                value_batch.push(Box::new(move || l.on_data_change(snapshot)));
            }
            Registered::Child(l) => child_batch.extend(child_diff(l, &path, old, new)),
        }
    }
    child_batch.extend(value_batch);
    child_batch
}

impl Inner {
    fn write(&self, updates: Vec<(Vec<String>, Value)>) -> WriteOperation {
        let source = OperationSource::<()>::new();
        let op = source.operation();
        {
            let mut state = self.tree.lock();
            let denied = updates
                .iter()
                .find(|(p, _)| state.is_write_denied(p))
                .map(|(p, _)| path::canonical(p));
            if let Some(denied) = denied {
                let error = ServiceError::permission_denied(&denied);
                tracing::debug!(path = %denied, "write denied");
                self.dispatcher.enqueue(vec![Box::new(move || {
                    source.fail(error);
                })]);
            } else {
                let paths: Vec<Vec<String>> = updates.iter().map(|(p, _)| p.clone()).collect();
                let affected = state.registry.affected_by(&paths);
                let before: Vec<Value> = affected
                    .iter()
                    .map(|r| tree::get(&state.root, &r.path).clone())
                    .collect();
                for (p, value) in updates {
                    tree::set(&mut state.root, &p, tree::normalize(value));
                }
                let mut batch = notifications(&state.root, &affected, &before);
                batch.push(Box::new(move || {
                    source.succeed_empty();
                }));
                self.dispatcher.enqueue(batch);
            }
        }
        self.dispatcher.flush();
        op
    }

    /// Remove every listener at or below `path` and cancel it with `error`.
    fn revoke(&self, at: &[String], error: ServiceError) -> usize {
        let count = {
            let mut state = self.tree.lock();
            let drained = state.registry.drain_within(at);
            let batch: Vec<Notification> = drained
                .iter()
                .map(|r| cancel(&r.listener, error.clone()))
                .collect();
            self.dispatcher.enqueue(batch);
            drained.len()
        };
        if count > 0 {
            tracing::warn!(path = %path::canonical(at), count, error = %error, "listeners revoked");
        }
        self.dispatcher.flush();
        count
    }
}

// ============================================================================
// MemoryDatabase
// ============================================================================

/// Handle to an in-memory database. Cheap to clone.
#[derive(Clone)]
pub struct MemoryDatabase {
    inner: Arc<Inner>,
}

impl MemoryDatabase {
    /// An empty database delivering callbacks inline.
    pub fn new() -> Self {
        Self::with_options(MemoryDatabaseOptions::default())
    }

    pub fn with_options(options: MemoryDatabaseOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                tree: Mutex::new(Tree {
                    root: tree::normalize(options.seed),
                    registry: ListenerRegistry::new(),
                    read_denied: Vec::new(),
                    write_denied: Vec::new(),
                }),
                dispatcher: Dispatcher::new(options.delivery),
                push_ids: Mutex::new(PushIdGenerator::new()),
            }),
        }
    }

    pub fn root(&self) -> Arc<MemoryRef> {
        Arc::new(MemoryRef {
            db: Arc::clone(&self.inner),
            segments: Vec::new(),
        })
    }

    pub fn reference(&self, path: &str) -> Result<Arc<MemoryRef>> {
        Ok(Arc::new(MemoryRef {
            db: Arc::clone(&self.inner),
            segments: path::segments(path)?,
        }))
    }

    /// Current value at `path` (`Null` when absent).
    pub fn value_at(&self, path: &str) -> Result<Value> {
        let segments = path::segments(path)?;
        Ok(tree::get(&self.inner.tree.lock().root, &segments).clone())
    }

    /// Number of persistent listeners currently registered.
    pub fn listener_count(&self) -> usize {
        self.inner.tree.lock().registry.size()
    }

    /// Cancel every listener at or below `path` with `error`. Returns how
    /// many were cancelled.
    pub fn revoke_listeners(&self, path: &str, error: ServiceError) -> Result<usize> {
        let segments = path::segments(path)?;
        Ok(self.inner.revoke(&segments, error))
    }

    /// Refuse reads at or below `path`: current listeners there are
    /// cancelled, new registrations are cancelled immediately.
    pub fn deny_reads(&self, path: &str) -> Result<()> {
        let segments = path::segments(path)?;
        self.inner.tree.lock().read_denied.push(segments.clone());
        let error = ServiceError::permission_denied(&path::canonical(&segments));
        self.inner.revoke(&segments, error);
        Ok(())
    }

    /// Refuse writes at or below `path`.
    pub fn deny_writes(&self, path: &str) -> Result<()> {
        let segments = path::segments(path)?;
        self.inner.tree.lock().write_denied.push(segments);
        Ok(())
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDatabase")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// ============================================================================
// MemoryRef
// ============================================================================

/// A location in a [`MemoryDatabase`].
pub struct MemoryRef {
    db: Arc<Inner>,
    segments: Vec<String>,
}

impl MemoryRef {
    fn canonical(&self) -> String {
        path::canonical(&self.segments)
    }

    fn child_ref(&self, segments: Vec<String>) -> Arc<MemoryRef> {
        let mut all = self.segments.clone();
        all.extend(segments);
        Arc::new(MemoryRef {
            db: Arc::clone(&self.db),
            segments: all,
        })
    }

    fn register(&self, listener: Registered, persistent: bool) -> ListenerId {
        let path = self.canonical();
        let id = {
            let mut state = self.db.tree.lock();
            if state.is_read_denied(&self.segments) {
                let id = state.registry.allocate();
                let batch = vec![cancel(&listener, ServiceError::permission_denied(&path))];
                self.db.dispatcher.enqueue(batch);
                id
            } else {
                let current = tree::get(&state.root, &self.segments).clone();
                let id = if persistent {
                    state.registry.on(self.segments.clone(), listener.clone())
                } else {
                    state.registry.allocate()
                };
                let batch: Vec<Notification> = match &listener {
                    Registered::Value(l) => {
                        let l = Arc::clone(l);
                        let snapshot = DataSnapshot::new(path, current);
                        vec![Box::new(move || l.on_data_change(snapshot))]
                    }
                    Registered::Child(l) => initial_children(l, &path, &current),
                };
                self.db.dispatcher.enqueue(batch);
                id
            }
        };
        self.db.dispatcher.flush();
        id
    }
}

impl Query for MemoryRef {
    fn path(&self) -> String {
        self.canonical()
    }

    fn add_single_value_listener(&self, listener: Arc<dyn ValueEventListener>) -> ListenerId {
        self.register(Registered::Value(listener), false)
    }

    fn add_value_listener(&self, listener: Arc<dyn ValueEventListener>) -> ListenerId {
        self.register(Registered::Value(listener), true)
    }

    fn add_child_listener(&self, listener: Arc<dyn ChildEventListener>) -> ListenerId {
        self.register(Registered::Child(listener), true)
    }

    fn remove_listener(&self, id: ListenerId) {
        if self.db.tree.lock().registry.off(id) {
            tracing::debug!(path = %self.canonical(), listener = id, "memory listener removed");
        }
    }
}

impl DatabaseReference for MemoryRef {
    fn key(&self) -> Option<String> {
        self.segments.last().cloned()
    }

    fn child(&self, child_path: &str) -> Result<Arc<dyn DatabaseReference>> {
        Ok(self.child_ref(path::segments(child_path)?))
    }

    fn push(&self) -> Arc<dyn DatabaseReference> {
        let key = self.db.push_ids.lock().next_id();
        self.child_ref(vec![key])
    }

    fn set_value(&self, value: Value) -> WriteOperation {
        self.db.write(vec![(self.segments.clone(), value)])
    }

    fn update_children(&self, updates: BTreeMap<String, Value>) -> WriteOperation {
        let mut resolved = Vec::with_capacity(updates.len());
        for (relative, value) in updates {
            match path::segments(&relative) {
                Ok(segments) => {
                    let mut full = self.segments.clone();
                    full.extend(segments);
                    resolved.push((full, value));
                }
                Err(err) => {
                    let source = OperationSource::<()>::new();
                    source.fail(ServiceError::new(
                        ServiceErrorCode::OperationFailed,
                        err.to_string(),
                    ));
                    return source.operation();
                }
            }
        }
        self.db.write(resolved)
    }
}

impl fmt::Debug for MemoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRef")
            .field("path", &self.canonical())
            .finish()
    }
}
