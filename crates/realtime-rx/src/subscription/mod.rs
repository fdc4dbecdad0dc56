//! Subscription core: turns callback registrations into streams.
//!
//! # Overview
//!
//! [`Subscription::create`] takes the registration step and returns a stream.
//! On first poll the registration runs with an [`Emitter`]; callbacks push
//! through the emitter, the consumer pulls from the stream. Each subscription
//! walks `Pending -> Active -> {Completed | Errored | Cancelled}` and runs its
//! teardown exactly once, before an error becomes visible and no later than
//! the unsubscribe call.
//!
//! # Modules
//!
//! - [`state`]: [`Phase`] and the shared guard/queue.
//! - [`emitter`]: [`Emitter<T>`], the producer half.
//! - [`stream`]: [`Subscription<T>`], the consumer half.

pub mod emitter;
pub mod state;
pub mod stream;

pub use emitter::Emitter;
pub use state::{Phase, Teardown};
pub use stream::{OnSubscribe, Subscription};

/// A bridge stream the consumer can cancel before it ends.
///
/// Both [`Subscription`] and the composed `Observed` streams implement it,
/// so code holding either can cancel the same way.
pub trait Unsubscribe {
    /// Stop receiving items and release the listener. Idempotent.
    fn unsubscribe(&mut self);

    fn is_unsubscribed(&self) -> bool;
}
