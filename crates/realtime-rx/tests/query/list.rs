//! Tests for `single_list_values` and `continuous_list_values`.

use futures::{FutureExt, StreamExt};
use realtime_rx::error::RealtimeError;
use realtime_rx::query::{continuous_list_values, single_list_values, Observed};
use serde_json::json;

use super::mock::MockQuery;

fn drain_ready<T>(stream: &mut Observed<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Some(Some(item)) = stream.next().now_or_never() {
        out.push(item.unwrap());
    }
    out
}

#[test]
fn single_list_yields_each_child_then_completes() {
    let query = MockQuery::new("/tags");
    let mut stream = single_list_values::<String, _>(query.clone());
    assert!(stream.next().now_or_never().is_none());

    query.fire_value(json!({ "a": "rust", "b": "async", "c": "streams" }));

    assert_eq!(drain_ready(&mut stream), vec!["rust", "async", "streams"]);
    assert!(stream.is_unsubscribed());
    assert_eq!(query.log(), vec!["single:1", "remove:1"]);
}

#[test]
fn missing_location_yields_no_items() {
    let query = MockQuery::new("/tags");
    let mut stream = single_list_values::<String, _>(query.clone());
    assert!(stream.next().now_or_never().is_none());

    query.fire_value(json!(null));
    assert!(drain_ready(&mut stream).is_empty());
    assert!(matches!(stream.next().now_or_never(), Some(None)));
}

#[test]
fn array_values_skip_holes() {
    let query = MockQuery::new("/tags");
    let mut stream = single_list_values::<String, _>(query.clone());
    assert!(stream.next().now_or_never().is_none());

    query.fire_value(json!(["a", null, "c"]));
    assert_eq!(drain_ready(&mut stream), vec!["a", "c"]);
}

#[test]
fn continuous_list_re_lists_on_every_value() {
    let query = MockQuery::new("/scores");
    let mut stream = continuous_list_values::<u32, _>(query.clone());
    assert!(stream.next().now_or_never().is_none());

    query.fire_value(json!({ "x": 1, "y": 2 }));
    assert_eq!(drain_ready(&mut stream), vec![1, 2]);

    query.fire_value(json!({ "x": 5 }));
    assert_eq!(drain_ready(&mut stream), vec![5]);

    assert!(!stream.is_unsubscribed());
    stream.unsubscribe();
    assert_eq!(query.log(), vec!["value:1", "remove:1"]);
}

#[test]
fn bad_child_ends_the_list_stream() {
    let query = MockQuery::new("/scores");
    let mut stream = continuous_list_values::<u32, _>(query.clone());
    assert!(stream.next().now_or_never().is_none());

    query.fire_value(json!({ "x": 1, "y": "not a number", "z": 3 }));

    assert!(matches!(stream.next().now_or_never(), Some(Some(Ok(1)))));
    match stream.next().now_or_never() {
        Some(Some(Err(RealtimeError::Decode { path, .. }))) => assert_eq!(path, "/scores/y"),
        other => panic!("expected decode error, got {other:?}"),
    }
    assert!(matches!(stream.next().now_or_never(), Some(None)));
    assert_eq!(query.active(), 0);
}
