//! Observed<T>: a composed bridge stream that ends after its first error.
//!
//! Decoding and fan-out are plain `StreamExt` combinators over a
//! [`crate::subscription::Subscription`]; wrapping the result in
//! [`end_on_error`] restores the terminal-error contract and drops the
//! upstream subscription (deregistering its listener) as soon as an error
//! is yielded.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, FusedStream, Stream, StreamExt};

use crate::error::Result;
use crate::subscription::Unsubscribe;

pub struct Observed<T> {
    inner: Option<BoxStream<'static, Result<T>>>,
}

/// Terminate `stream` after its first `Err` item.
pub fn end_on_error<S, T>(stream: S) -> Observed<T>
where
    S: Stream<Item = Result<T>> + Send + 'static,
{
    Observed {
        inner: Some(stream.boxed()),
    }
}

impl<T> Observed<T> {
    /// Drop the upstream subscription. Safe to call repeatedly.
    pub fn unsubscribe(&mut self) {
        self.inner = None;
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.inner.is_none()
    }
}

impl<T> Unsubscribe for Observed<T> {
    fn unsubscribe(&mut self) {
        Observed::unsubscribe(self)
    }

    fn is_unsubscribed(&self) -> bool {
        Observed::is_unsubscribed(self)
    }
}

impl<T> Stream for Observed<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(inner) = self.inner.as_mut() else {
            return Poll::Ready(None);
        };
        match inner.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(item))) => Poll::Ready(Some(Ok(item))),
            Poll::Ready(Some(Err(err))) => {
                self.inner = None;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.inner = None;
                Poll::Ready(None)
            }
        }
    }
}

impl<T> FusedStream for Observed<T> {
    fn is_terminated(&self) -> bool {
        self.inner.is_none()
    }
}

impl<T> fmt::Debug for Observed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observed")
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}
