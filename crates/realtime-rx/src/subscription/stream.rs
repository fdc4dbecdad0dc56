//! Subscription<T>: the consumer half, exposed as a `futures::Stream`.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{FusedStream, Stream};

use crate::error::Result;

use super::emitter::Emitter;
use super::state::{Phase, Shared};
use super::Unsubscribe;

/// Performs the registration for a subscription. Runs at most once, on first
/// poll, and receives the emitter that the registered callbacks feed.
pub type OnSubscribe<T> = Box<dyn FnOnce(Emitter<T>) + Send>;

/// A lazily started, cancellable stream of `Result<T>`.
///
/// Nothing is registered until the first poll. An `Err` item is terminal.
/// Dropping the subscription unsubscribes it.
pub struct Subscription<T> {
    shared: Arc<Shared<T>>,
    on_subscribe: Option<OnSubscribe<T>>,
    finished: bool,
}

impl<T> Subscription<T> {
    /// Create a subscription whose registration is performed by
    /// `on_subscribe` when the stream is first polled.
    pub fn create(on_subscribe: impl FnOnce(Emitter<T>) + Send + 'static) -> Self {
        Self {
            shared: Arc::new(Shared::new()),
            on_subscribe: Some(Box::new(on_subscribe)),
            finished: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase
    }

    pub fn is_unsubscribed(&self) -> bool {
        !self.shared.is_active()
    }

    /// Cancel the subscription. Runs the teardown if it has not run yet and
    /// discards anything still queued. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        let owns_teardown = self.shared.deactivate();
        let teardown = {
            let mut st = self.shared.state.lock();
            if !st.phase.is_terminal() {
                st.phase = Phase::Cancelled;
            }
            st.queue.clear();
            st.error = None;
            st.waker = None;
            if owns_teardown {
                st.teardown.take()
            } else {
                None
            }
        };
        if let Some(teardown) = teardown {
            tracing::debug!("subscription cancelled by consumer");
            teardown();
        }
    }

    fn start(&mut self) {
        let Some(on_subscribe) = self.on_subscribe.take() else {
            return;
        };
        {
            let mut st = self.shared.state.lock();
            if st.phase != Phase::Pending || !self.shared.is_active() {
                return;
            }
            st.phase = Phase::Active;
        }
        on_subscribe(Emitter {
            shared: Arc::clone(&self.shared),
        });
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        this.start();

        let mut st = this.shared.state.lock();
        if let Some(item) = st.queue.pop_front() {
            return Poll::Ready(Some(Ok(item)));
        }
        match st.phase {
            Phase::Pending | Phase::Active => {
                st.waker = Some(cx.waker().clone());
                Poll::Pending
            }
            Phase::Errored => {
                this.finished = true;
                Poll::Ready(st.error.take().map(Err))
            }
            Phase::Completed | Phase::Cancelled => {
                this.finished = true;
                Poll::Ready(None)
            }
        }
    }
}

impl<T> FusedStream for Subscription<T> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

impl<T> Unsubscribe for Subscription<T> {
    fn unsubscribe(&mut self) {
        Subscription::unsubscribe(self)
    }

    fn is_unsubscribed(&self) -> bool {
        Subscription::is_unsubscribed(self)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("phase", &self.phase())
            .field("finished", &self.finished)
            .finish()
    }
}
