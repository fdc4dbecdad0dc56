//! Access rules and listener revocation.

use futures::executor::block_on_stream;
use futures::{FutureExt, StreamExt};
use realtime_rx::error::{RealtimeError, ServiceError, ServiceErrorCode};
use realtime_rx::memory::MemoryDatabase;
use realtime_rx::query::{child_events, continuous_value, single_value};
use realtime_rx::service::DatabaseReference;
use realtime_rx::task::from_task;
use serde_json::json;

/// Route library logs to the test harness; `RUST_LOG` selects the level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn code_of<T: std::fmt::Debug>(item: Option<Option<realtime_rx::Result<T>>>) -> ServiceErrorCode {
    match item {
        Some(Some(Err(RealtimeError::ListenerCancelled(e)))) => e.code,
        other => panic!("expected cancellation, got {other:?}"),
    }
}

#[test]
fn denying_reads_cancels_existing_listeners() {
    init_tracing();
    let db = MemoryDatabase::new();
    let mut values = continuous_value(db.reference("/private/a").unwrap());
    let mut children = child_events(db.reference("/private").unwrap());
    assert!(values.next().now_or_never().is_some());
    assert!(children.next().now_or_never().is_none());
    assert_eq!(db.listener_count(), 2);

    db.deny_reads("/private").unwrap();
    assert_eq!(db.listener_count(), 0);

    assert_eq!(code_of(values.next().now_or_never()), ServiceErrorCode::PermissionDenied);
    assert_eq!(code_of(children.next().now_or_never()), ServiceErrorCode::PermissionDenied);
}

#[test]
fn denied_location_cancels_new_registrations() {
    let db = MemoryDatabase::new();
    db.deny_reads("/private").unwrap();

    let mut stream = single_value(db.reference("/private/x").unwrap());
    assert_eq!(code_of(stream.next().now_or_never()), ServiceErrorCode::PermissionDenied);
    assert!(matches!(stream.next().now_or_never(), Some(None)));
    assert_eq!(db.listener_count(), 0);
}

#[test]
fn reads_outside_denied_subtree_still_work() {
    let db = MemoryDatabase::new();
    db.deny_reads("/private").unwrap();
    let items: Vec<_> = block_on_stream(single_value(db.reference("/public").unwrap())).collect();
    assert!(matches!(&items[..], [Ok(_)]));
}

#[test]
fn denied_write_fails_and_leaves_tree_untouched() {
    let db = MemoryDatabase::new();
    db.deny_writes("/locked").unwrap();

    let op = db.reference("/locked/a").unwrap().set_value(json!(1));
    let items: Vec<_> = block_on_stream(from_task(op)).collect();
    match &items[..] {
        [Err(RealtimeError::Operation(e))] => {
            assert_eq!(e.code, ServiceErrorCode::PermissionDenied);
            assert!(e.message.contains("/locked/a"));
        }
        other => panic!("expected permission failure, got {other:?}"),
    }
    assert_eq!(db.value_at("/locked").unwrap(), json!(null));
}

#[test]
fn revoke_listeners_reports_count_and_reason() {
    init_tracing();
    let db = MemoryDatabase::new();
    let mut a = continuous_value(db.reference("/feed/a").unwrap());
    let mut b = continuous_value(db.reference("/feed/b").unwrap());
    let mut other = continuous_value(db.reference("/other").unwrap());
    for s in [&mut a, &mut b, &mut other] {
        assert!(s.next().now_or_never().is_some());
    }

    let reason = ServiceError::new(ServiceErrorCode::Disconnected, "connection lost");
    assert_eq!(db.revoke_listeners("/feed", reason).unwrap(), 2);
    assert_eq!(db.listener_count(), 1);

    assert_eq!(code_of(a.next().now_or_never()), ServiceErrorCode::Disconnected);
    assert_eq!(code_of(b.next().now_or_never()), ServiceErrorCode::Disconnected);
    assert!(other.next().now_or_never().is_none());
}
