//! Shared per-subscription state.
//!
//! # Threading model
//!
//! The producer half ([`super::Emitter`]) is driven from the service's
//! delivery context and the consumer half ([`super::Subscription`]) from the
//! polling task. Both sides share one [`Shared`]:
//!   - `active`: the guard checked before every emission, error and
//!     completion. It flips to `false` exactly once, and whoever flips it
//!     owns the teardown.
//!   - `state`: queue, phase, terminal error and the consumer's waker
//!     (`parking_lot::Mutex`).
//!
//! The lock is never held while a teardown or a waker runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::Waker;

use parking_lot::Mutex;

use crate::error::RealtimeError;

/// Deregisters whatever the subscription registered. Runs at most once.
pub type Teardown = Box<dyn FnOnce() + Send>;

/// Lifecycle of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, registration not yet performed.
    Pending,
    /// Registered and accepting notifications.
    Active,
    Completed,
    Errored,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored | Self::Cancelled)
    }
}

pub(crate) struct State<T> {
    pub(crate) phase: Phase,
    pub(crate) queue: VecDeque<T>,
    pub(crate) error: Option<RealtimeError>,
    pub(crate) waker: Option<Waker>,
    pub(crate) teardown: Option<Teardown>,
}

pub(crate) struct Shared<T> {
    active: AtomicBool,
    pub(crate) state: Mutex<State<T>>,
}

impl<T> Shared<T> {
    pub(crate) fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            state: Mutex::new(State {
                phase: Phase::Pending,
                queue: VecDeque::new(),
                error: None,
                waker: None,
                teardown: None,
            }),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Flip the guard. Returns `true` for the single caller that flipped it.
    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    /// Store `teardown`, or run it right away if the subscription already
    /// ended (a listener may fire and complete during its own registration).
    pub(crate) fn set_teardown(&self, teardown: Teardown) {
        let run_now = {
            let mut st = self.state.lock();
            if self.is_active() {
                st.teardown = Some(teardown);
                None
            } else {
                Some(teardown)
            }
        };
        if let Some(teardown) = run_now {
            teardown();
        }
    }

    pub(crate) fn take_teardown(&self) -> Option<Teardown> {
        self.state.lock().teardown.take()
    }
}
