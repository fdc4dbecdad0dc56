//! OperationSource<T>: a manually resolved [`AsyncOperation`].
//!
//! The producer keeps the source and resolves it once; consumers receive the
//! shared [`SourcedOperation`] handle. Handlers registered before resolution
//! run in registration order when it happens; handlers registered afterwards
//! run immediately with the stored outcome.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ServiceError;
use crate::service::{AsyncOperation, CompletionHandler, OperationResult};

enum Slot<T> {
    Pending(Vec<CompletionHandler<T>>),
    Resolved(OperationResult<T>),
}

/// The operation handle produced by an [`OperationSource`].
pub struct SourcedOperation<T> {
    slot: Mutex<Slot<T>>,
}

impl<T> SourcedOperation<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(*self.slot.lock(), Slot::Resolved(_))
    }

    /// Number of handlers waiting for resolution.
    pub fn pending_handlers(&self) -> usize {
        match &*self.slot.lock() {
            Slot::Pending(handlers) => handlers.len(),
            Slot::Resolved(_) => 0,
        }
    }
}

impl<T: Clone + Send + 'static> AsyncOperation for SourcedOperation<T> {
    type Output = T;

    fn on_complete(&self, handler: CompletionHandler<T>) {
        let outcome = {
            let mut slot = self.slot.lock();
            match &mut *slot {
                Slot::Pending(handlers) => {
                    handlers.push(handler);
                    return;
                }
                Slot::Resolved(outcome) => outcome.clone(),
            }
        };
        handler(outcome);
    }
}

/// Resolving side of a [`SourcedOperation`].
pub struct OperationSource<T> {
    op: Arc<SourcedOperation<T>>,
}

impl<T: Clone + Send + 'static> OperationSource<T> {
    pub fn new() -> Self {
        Self {
            op: Arc::new(SourcedOperation {
                slot: Mutex::new(Slot::Pending(Vec::new())),
            }),
        }
    }

    pub fn operation(&self) -> Arc<SourcedOperation<T>> {
        Arc::clone(&self.op)
    }

    /// Resolve with `outcome`. Returns `false` (and changes nothing) if the
    /// operation was already resolved.
    pub fn resolve(&self, outcome: OperationResult<T>) -> bool {
        let handlers = {
            let mut slot = self.op.slot.lock();
            match &mut *slot {
                Slot::Resolved(_) => return false,
                Slot::Pending(handlers) => {
                    let handlers = std::mem::take(handlers);
                    *slot = Slot::Resolved(outcome.clone());
                    handlers
                }
            }
        };
        for handler in handlers {
            handler(outcome.clone());
        }
        true
    }

    pub fn succeed(&self, value: T) -> bool {
        self.resolve(Ok(Some(value)))
    }

    /// Resolve successfully without a value.
    pub fn succeed_empty(&self) -> bool {
        self.resolve(Ok(None))
    }

    pub fn fail(&self, reason: ServiceError) -> bool {
        self.resolve(Err(reason))
    }
}

impl<T: Clone + Send + 'static> Default for OperationSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// An operation that is already resolved with `outcome`.
pub fn ready<T: Clone + Send + 'static>(outcome: OperationResult<T>) -> Arc<SourcedOperation<T>> {
    let source = OperationSource::new();
    source.resolve(outcome);
    source.operation()
}
