//! Listener implementations that forward service callbacks into an
//! [`Emitter`]. Each instance belongs to exactly one subscription.

use crate::error::{RealtimeError, ServiceError};
use crate::service::{ChildEventListener, DataSnapshot, ValueEventListener};
use crate::subscription::Emitter;

use super::event::{ChildEvent, ChildEventKind};

/// Forwards the first snapshot, then completes.
pub(crate) struct SingleValueListener {
    pub(crate) emitter: Emitter<DataSnapshot>,
}

impl ValueEventListener for SingleValueListener {
    fn on_data_change(&self, snapshot: DataSnapshot) {
        if self.emitter.on_next(snapshot) {
            self.emitter.on_completed();
        }
    }

    fn on_cancelled(&self, error: ServiceError) {
        self.emitter.on_error(RealtimeError::ListenerCancelled(error));
    }
}

/// Forwards every snapshot until the subscription ends.
pub(crate) struct ContinuousValueListener {
    pub(crate) emitter: Emitter<DataSnapshot>,
}

impl ValueEventListener for ContinuousValueListener {
    fn on_data_change(&self, snapshot: DataSnapshot) {
        self.emitter.on_next(snapshot);
    }

    fn on_cancelled(&self, error: ServiceError) {
        self.emitter.on_error(RealtimeError::ListenerCancelled(error));
    }
}

/// Routes all four child callbacks through one emission point.
pub(crate) struct ChildListener {
    pub(crate) emitter: Emitter<ChildEvent<DataSnapshot>>,
}

impl ChildListener {
    fn emit(&self, kind: ChildEventKind, snapshot: DataSnapshot, previous: Option<String>) {
        self.emitter
            .on_next(ChildEvent::from_snapshot(kind, snapshot, previous));
    }
}

impl ChildEventListener for ChildListener {
    fn on_child_added(&self, snapshot: DataSnapshot, previous_sibling_key: Option<String>) {
        self.emit(ChildEventKind::Added, snapshot, previous_sibling_key);
    }

    fn on_child_changed(&self, snapshot: DataSnapshot, previous_sibling_key: Option<String>) {
        self.emit(ChildEventKind::Changed, snapshot, previous_sibling_key);
    }

    fn on_child_removed(&self, snapshot: DataSnapshot) {
        self.emit(ChildEventKind::Removed, snapshot, None);
    }

    fn on_child_moved(&self, snapshot: DataSnapshot, previous_sibling_key: Option<String>) {
        self.emit(ChildEventKind::Moved, snapshot, previous_sibling_key);
    }

    fn on_cancelled(&self, error: ServiceError) {
        self.emitter.on_error(RealtimeError::ListenerCancelled(error));
    }
}
