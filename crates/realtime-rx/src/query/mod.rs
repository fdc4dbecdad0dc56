//! Query bridge: realtime listeners as streams.
//!
//! # Overview
//!
//! Every value-observing stream is built from two listener primitives:
//! [`single_value`] (one-time value listener) and [`continuous_value`]
//! (persistent value listener). The typed and list variants compose those
//! with decoding and fan-out. [`child_events`] bridges the four-callback
//! child listener.
//!
//! Listeners are registered on first poll and removed exactly once: when
//! the stream completes, when the service cancels the listener (before the
//! error is yielded), or when the consumer unsubscribes or drops the stream.
//!
//! # Modules
//!
//! - [`event`]: [`ChildEvent`] and [`ChildEventKind`].
//! - [`ops`]: [`Observed`] and [`end_on_error`].

pub mod event;
mod listeners;
pub mod ops;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::service::{DataSnapshot, ListenerId, Query};
use crate::subscription::{Emitter, Subscription};

use listeners::{ChildListener, ContinuousValueListener, SingleValueListener};

pub use event::{ChildEvent, ChildEventKind};
pub use ops::{end_on_error, Observed};

/// Register through `register` on first poll; remove the listener on
/// teardown.
fn observe<Q, T>(
    query: Arc<Q>,
    register: impl FnOnce(&Q, Emitter<T>) -> ListenerId + Send + 'static,
) -> Subscription<T>
where
    Q: Query + ?Sized + 'static,
    T: Send + 'static,
{
    Subscription::create(move |emitter| {
        let id = register(&*query, emitter.clone());
        tracing::debug!(path = %query.path(), listener = id, "listener registered");
        emitter.set_teardown(move || {
            query.remove_listener(id);
            tracing::debug!(path = %query.path(), listener = id, "listener removed");
        });
    })
}

fn decode<T: DeserializeOwned>(item: Result<DataSnapshot>) -> Result<T> {
    item.and_then(|snapshot| snapshot.decode_as())
}

/// Each snapshot becomes one item per direct child, in child order.
fn fan_out<T: DeserializeOwned>(
    item: Result<DataSnapshot>,
) -> stream::Iter<std::vec::IntoIter<Result<T>>> {
    let items = match item {
        Ok(snapshot) => snapshot
            .children()
            .iter()
            .map(DataSnapshot::decode_as)
            .collect(),
        Err(err) => vec![Err(err)],
    };
    stream::iter(items)
}

/// The current value of `query`, once.
pub fn single_value<Q>(query: Arc<Q>) -> Subscription<DataSnapshot>
where
    Q: Query + ?Sized + 'static,
{
    observe(query, |q, emitter| {
        q.add_single_value_listener(Arc::new(SingleValueListener { emitter }))
    })
}

/// [`single_value`] decoded to `T`.
pub fn single_value_as<T, Q>(query: Arc<Q>) -> Observed<T>
where
    T: DeserializeOwned + Send + 'static,
    Q: Query + ?Sized + 'static,
{
    end_on_error(single_value(query).map(decode::<T>))
}

/// The current value of `query`, then every new value until unsubscribed.
pub fn continuous_value<Q>(query: Arc<Q>) -> Subscription<DataSnapshot>
where
    Q: Query + ?Sized + 'static,
{
    observe(query, |q, emitter| {
        q.add_value_listener(Arc::new(ContinuousValueListener { emitter }))
    })
}

/// [`continuous_value`] decoded to `T`.
pub fn continuous_value_as<T, Q>(query: Arc<Q>) -> Observed<T>
where
    T: DeserializeOwned + Send + 'static,
    Q: Query + ?Sized + 'static,
{
    end_on_error(continuous_value(query).map(decode::<T>))
}

/// For a list-shaped location: every child of every value, decoded to `T`.
pub fn continuous_list_values<T, Q>(query: Arc<Q>) -> Observed<T>
where
    T: DeserializeOwned + Send + 'static,
    Q: Query + ?Sized + 'static,
{
    end_on_error(continuous_value(query).flat_map(fan_out::<T>))
}

/// For a list-shaped location: every current child, decoded to `T`, once.
pub fn single_list_values<T, Q>(query: Arc<Q>) -> Observed<T>
where
    T: DeserializeOwned + Send + 'static,
    Q: Query + ?Sized + 'static,
{
    end_on_error(single_value(query).flat_map(fan_out::<T>))
}

/// One [`ChildEvent`] per child callback, in delivery order, until
/// unsubscribed.
pub fn child_events<Q>(query: Arc<Q>) -> Subscription<ChildEvent<DataSnapshot>>
where
    Q: Query + ?Sized + 'static,
{
    observe(query, |q, emitter| {
        q.add_child_listener(Arc::new(ChildListener { emitter }))
    })
}

/// [`child_events`] with values decoded to `T`.
pub fn child_events_as<T, Q>(query: Arc<Q>) -> Observed<ChildEvent<T>>
where
    T: DeserializeOwned + Send + 'static,
    Q: Query + ?Sized + 'static,
{
    end_on_error(child_events(query).map(|item| item.and_then(ChildEvent::decode::<T>)))
}
