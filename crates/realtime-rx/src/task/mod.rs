//! Task bridge: single-result operations as zero-or-one item streams.
//!
//! - [`from_task`] / [`from_task_non_null`] / [`from_task_with`] wrap an
//!   operation that already exists.
//! - [`deferred_from_task`] / [`deferred_from_task_non_null`] wrap a supplier;
//!   the operation is created per subscription, so side effects such as
//!   writes only happen once somebody listens, and happen again on retry.
//! - [`source`]: [`OperationSource`], a manually resolved operation.

pub mod source;

use std::fmt;
use std::sync::Arc;

use crate::error::RealtimeError;
use crate::service::AsyncOperation;
use crate::subscription::{Emitter, Subscription};

pub use source::{ready, OperationSource, SourcedOperation};

/// Decides which successful outcomes become items.
type Wrap<In, Out> = fn(Option<In>) -> Option<Out>;

fn keep_null<T>(value: Option<T>) -> Option<Option<T>> {
    Some(value)
}

fn skip_null<T>(value: Option<T>) -> Option<Option<T>> {
    value.map(Some)
}

fn unwrap_non_null<T>(value: Option<T>) -> Option<T> {
    value
}

/// Register the completion handler for one subscription.
fn register<O, T>(op: &O, emitter: Emitter<T>, wrap: Wrap<O::Output, T>)
where
    O: AsyncOperation + ?Sized,
    T: Send + 'static,
{
    op.on_complete(Box::new(move |outcome| {
        if emitter.is_unsubscribed() {
            tracing::trace!("operation resolved after unsubscribe, discarding");
            return;
        }
        match outcome {
            Ok(value) => {
                if let Some(item) = wrap(value) {
                    emitter.on_next(item);
                }
                emitter.on_completed();
            }
            Err(reason) => emitter.on_error(RealtimeError::Operation(reason)),
        }
    }));
}

fn subscribe_to<O, T>(op: Arc<O>, wrap: Wrap<O::Output, T>) -> Subscription<T>
where
    O: AsyncOperation + ?Sized + 'static,
    T: Send + 'static,
{
    Subscription::create(move |emitter| register(&*op, emitter, wrap))
}

/// Stream the outcome of `op`.
///
/// A successful value is yielded as `Some(v)`. A successful empty outcome is
/// yielded as `None` when `emit_null_as_value` is set, otherwise the stream
/// just ends. A failure is yielded as [`RealtimeError::Operation`] with the
/// reason unchanged.
pub fn from_task_with<O>(op: Arc<O>, emit_null_as_value: bool) -> Subscription<Option<O::Output>>
where
    O: AsyncOperation + ?Sized + 'static,
{
    if emit_null_as_value {
        subscribe_to(op, keep_null)
    } else {
        subscribe_to(op, skip_null)
    }
}

/// [`from_task_with`] that yields empty outcomes as `None`.
pub fn from_task<O>(op: Arc<O>) -> Subscription<Option<O::Output>>
where
    O: AsyncOperation + ?Sized + 'static,
{
    from_task_with(op, true)
}

/// Stream the value of `op`; an empty outcome ends the stream with no items.
pub fn from_task_non_null<O>(op: Arc<O>) -> Subscription<O::Output>
where
    O: AsyncOperation + ?Sized + 'static,
{
    subscribe_to(op, unwrap_non_null)
}

/// A re-subscribable recipe: every [`subscribe`](Deferred::subscribe) call
/// produces an independent subscription with its own underlying operation.
pub struct Deferred<T> {
    start: Arc<dyn Fn(Emitter<T>) + Send + Sync>,
}

impl<T: Send + 'static> Deferred<T> {
    fn new(start: impl Fn(Emitter<T>) + Send + Sync + 'static) -> Self {
        Self {
            start: Arc::new(start),
        }
    }

    /// A fresh subscription. The supplier runs on its first poll.
    pub fn subscribe(&self) -> Subscription<T> {
        let start = Arc::clone(&self.start);
        Subscription::create(move |emitter| start(emitter))
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            start: Arc::clone(&self.start),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

/// Like [`from_task`], but the operation is created by `supplier` at
/// subscription time, once per subscription.
pub fn deferred_from_task<F, O>(supplier: F) -> Deferred<Option<O::Output>>
where
    F: Fn() -> Arc<O> + Send + Sync + 'static,
    O: AsyncOperation + ?Sized + 'static,
{
    Deferred::new(move |emitter| register(&*supplier(), emitter, keep_null))
}

/// Like [`from_task_non_null`], but the operation is created by `supplier`
/// at subscription time, once per subscription.
pub fn deferred_from_task_non_null<F, O>(supplier: F) -> Deferred<O::Output>
where
    F: Fn() -> Arc<O> + Send + Sync + 'static,
    O: AsyncOperation + ?Sized + 'static,
{
    Deferred::new(move |emitter| register(&*supplier(), emitter, unwrap_non_null))
}
