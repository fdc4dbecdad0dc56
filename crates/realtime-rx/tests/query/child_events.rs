//! Tests for `child_events` and `child_events_as`.

use futures::{FutureExt, StreamExt};
use realtime_rx::error::{RealtimeError, ServiceError, ServiceErrorCode};
use realtime_rx::query::{child_events, child_events_as, ChildEvent, ChildEventKind};
use serde_json::json;

use super::mock::MockQuery;

fn describe<T: std::fmt::Debug>(event: &ChildEvent<T>) -> String {
    format!(
        "{:?} {} after {} = {:?}",
        event.kind,
        event.key.as_deref().unwrap_or("-"),
        event.previous_sibling_key.as_deref().unwrap_or("-"),
        event.value
    )
}

#[test]
fn every_callback_kind_maps_to_one_event_in_order() {
    let query = MockQuery::new("/comments");
    let mut stream = child_events_as::<u32, _>(query.clone());
    assert!(stream.next().now_or_never().is_none());
    assert_eq!(query.log(), vec!["child:1"]);

    query.fire_added("a", json!(1), None);
    query.fire_added("b", json!(2), Some("a"));
    query.fire_changed("a", json!(10), None);
    query.fire_moved("b", json!(2), None);
    query.fire_removed("a", json!(10));

    let mut seen = Vec::new();
    while let Some(Some(item)) = stream.next().now_or_never() {
        seen.push(describe(&item.unwrap()));
    }
    assert_eq!(
        seen,
        vec![
            "Added a after - = 1",
            "Added b after a = 2",
            "Changed a after - = 10",
            "Moved b after - = 2",
            "Removed a after - = 10",
        ]
    );
}

#[test]
fn removed_event_carries_key_and_last_value() {
    let query = MockQuery::new("/comments");
    let mut stream = child_events(query.clone());
    assert!(stream.next().now_or_never().is_none());

    query.fire_removed("c7", json!({ "text": "bye" }));

    let event = stream.next().now_or_never().unwrap().unwrap().unwrap();
    assert_eq!(event.kind, ChildEventKind::Removed);
    assert_eq!(event.key.as_deref(), Some("c7"));
    assert_eq!(event.previous_sibling_key, None);
    assert_eq!(event.value.value(), &json!({ "text": "bye" }));
    assert_eq!(event.value.path(), "/comments/c7");
}

#[test]
fn child_stream_runs_until_unsubscribed() {
    let query = MockQuery::new("/comments");
    let mut stream = child_events(query.clone());
    assert!(stream.next().now_or_never().is_none());

    query.fire_added("a", json!(1), None);
    assert!(matches!(stream.next().now_or_never(), Some(Some(Ok(_)))));
    assert!(stream.next().now_or_never().is_none());

    stream.unsubscribe();
    query.fire_added("b", json!(2), Some("a"));
    assert!(matches!(stream.next().now_or_never(), Some(None)));
    assert_eq!(query.log(), vec!["child:1", "remove:1"]);
}

#[test]
fn cancellation_is_terminal() {
    let query = MockQuery::new("/comments");
    let mut stream = child_events(query.clone());
    assert!(stream.next().now_or_never().is_none());

    query.fire_cancel(ServiceError::new(ServiceErrorCode::InvalidToken, "expired"));
    assert_eq!(query.log(), vec!["child:1", "remove:1"]);

    match stream.next().now_or_never() {
        Some(Some(Err(err @ RealtimeError::ListenerCancelled(_)))) => {
            assert_eq!(err.service_error().map(|e| e.code), Some(ServiceErrorCode::InvalidToken));
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert!(matches!(stream.next().now_or_never(), Some(None)));
}

#[test]
fn decode_failure_in_child_value_ends_stream() {
    let query = MockQuery::new("/comments");
    let mut stream = child_events_as::<u32, _>(query.clone());
    assert!(stream.next().now_or_never().is_none());

    query.fire_added("a", json!("text"), None);
    assert!(matches!(
        stream.next().now_or_never(),
        Some(Some(Err(RealtimeError::Decode { .. })))
    ));
    assert_eq!(query.active(), 0);
}
