//! Tests for `from_task`, `from_task_with` and `from_task_non_null`.

use futures::executor::block_on_stream;
use futures::{FutureExt, StreamExt};
use realtime_rx::error::{RealtimeError, ServiceError, ServiceErrorCode};
use realtime_rx::subscription::Phase;
use realtime_rx::task::{from_task, from_task_non_null, from_task_with, ready, OperationSource};

fn collect_ok<T>(stream: impl futures::Stream<Item = realtime_rx::Result<T>> + Unpin) -> Vec<T> {
    block_on_stream(stream).map(|item| item.unwrap()).collect()
}

// ============================================================================
// Success
// ============================================================================

#[test]
fn value_is_emitted_then_stream_completes() {
    let op = ready(Ok(Some(7u32)));
    assert_eq!(collect_ok(from_task(op)), vec![Some(7)]);
}

#[test]
fn non_null_variant_yields_bare_value() {
    let op = ready(Ok(Some("done".to_string())));
    assert_eq!(collect_ok(from_task_non_null(op)), vec!["done".to_string()]);
}

#[test]
fn empty_outcome_is_emitted_as_none_by_default() {
    let op = ready::<u32>(Ok(None));
    assert_eq!(collect_ok(from_task(op)), vec![None]);
}

#[test]
fn empty_outcome_can_complete_without_items() {
    let op = ready::<u32>(Ok(None));
    assert!(collect_ok(from_task_with(op.clone(), false)).is_empty());
    assert!(collect_ok(from_task_non_null(op)).is_empty());
}

// ============================================================================
// Failure
// ============================================================================

#[test]
fn failure_is_yielded_with_the_original_reason() {
    let reason = ServiceError::new(ServiceErrorCode::Disconnected, "socket closed")
        .with_details("retry later");
    let op = ready::<u32>(Err(reason.clone()));

    let items: Vec<_> = block_on_stream(from_task(op)).collect();
    assert_eq!(items.len(), 1);
    match &items[0] {
        Err(RealtimeError::Operation(got)) => assert_eq!(got, &reason),
        other => panic!("expected operation failure, got {other:?}"),
    }
}

#[test]
fn nothing_follows_a_failure() {
    let op = ready::<u32>(Err(ServiceError::new(ServiceErrorCode::Unknown, "boom")));
    let mut stream = from_task_non_null(op);
    assert!(matches!(stream.next().now_or_never(), Some(Some(Err(_)))));
    assert!(matches!(stream.next().now_or_never(), Some(None)));
    assert_eq!(stream.phase(), Phase::Errored);
}

// ============================================================================
// Laziness and cancellation
// ============================================================================

#[test]
fn handler_is_registered_on_first_poll() {
    let source = OperationSource::<u32>::new();
    let op = source.operation();
    let mut stream = from_task(op.clone());
    assert_eq!(op.pending_handlers(), 0);

    assert!(stream.next().now_or_never().is_none());
    assert_eq!(op.pending_handlers(), 1);

    source.succeed(3);
    assert!(matches!(stream.next().now_or_never(), Some(Some(Ok(Some(3))))));
    assert!(matches!(stream.next().now_or_never(), Some(None)));
}

#[test]
fn resolution_after_unsubscribe_is_discarded() {
    let source = OperationSource::<u32>::new();
    let mut stream = from_task(source.operation());
    assert!(stream.next().now_or_never().is_none());

    stream.unsubscribe();
    assert!(source.succeed(9));

    assert!(matches!(stream.next().now_or_never(), Some(None)));
    assert_eq!(stream.phase(), Phase::Cancelled);
}

#[test]
fn failure_after_drop_does_not_panic() {
    let source = OperationSource::<u32>::new();
    {
        let mut stream = from_task(source.operation());
        assert!(stream.next().now_or_never().is_none());
    }
    assert!(source.fail(ServiceError::new(ServiceErrorCode::Unavailable, "late")));
}

#[test]
fn each_subscription_to_the_same_operation_gets_the_outcome() {
    let source = OperationSource::<u32>::new();
    let mut a = from_task(source.operation());
    let mut b = from_task(source.operation());
    assert!(a.next().now_or_never().is_none());
    assert!(b.next().now_or_never().is_none());

    source.succeed(1);
    assert!(matches!(a.next().now_or_never(), Some(Some(Ok(Some(1))))));
    assert!(matches!(b.next().now_or_never(), Some(Some(Ok(Some(1))))));
}
