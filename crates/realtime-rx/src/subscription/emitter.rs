//! Emitter<T>: the producer half of a subscription.

use std::sync::Arc;

use crate::error::RealtimeError;

use super::state::{Phase, Shared, Teardown};

/// Pushes notifications into one subscription.
///
/// Cheap to clone; every clone feeds the same subscription. All methods
/// check the active guard first, so calls arriving after the consumer
/// unsubscribed (or after the stream terminated) are dropped silently.
pub struct Emitter<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Emitter<T> {
    /// `true` once the consumer unsubscribed or the stream terminated.
    pub fn is_unsubscribed(&self) -> bool {
        !self.shared.is_active()
    }

    /// Queue `item` for the consumer. Returns `false` if it was dropped.
    pub fn on_next(&self, item: T) -> bool {
        if !self.shared.is_active() {
            tracing::trace!("dropping notification delivered after unsubscribe");
            return false;
        }
        let waker = {
            let mut st = self.shared.state.lock();
            if st.phase != Phase::Active || !self.shared.is_active() {
                return false;
            }
            st.queue.push_back(item);
            st.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
        true
    }

    /// Terminate with `error`. The teardown runs before the error becomes
    /// visible to the consumer.
    pub fn on_error(&self, error: RealtimeError) {
        self.terminate(Phase::Errored, Some(error));
    }

    /// Terminate normally. Items already queued are still delivered.
    pub fn on_completed(&self) {
        self.terminate(Phase::Completed, None);
    }

    /// Register what to run when the subscription ends.
    ///
    /// If it already ended, `teardown` runs immediately.
    pub fn set_teardown(&self, teardown: impl FnOnce() + Send + 'static) {
        self.shared.set_teardown(Box::new(teardown) as Teardown);
    }

    fn terminate(&self, phase: Phase, error: Option<RealtimeError>) {
        if !self.shared.deactivate() {
            if error.is_some() {
                tracing::trace!("dropping error delivered after unsubscribe");
            }
            return;
        }
        if let Some(teardown) = self.shared.take_teardown() {
            teardown();
        }
        let waker = {
            let mut st = self.shared.state.lock();
            // An unsubscribe racing with this call wins.
            if st.phase == Phase::Active {
                st.phase = phase;
                st.error = error;
            }
            st.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}
