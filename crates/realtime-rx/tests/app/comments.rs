//! A comment list kept in sync from `watch_comments`.

use futures::{FutureExt, StreamExt};
use realtime_rx::app::{AppContext, AppPaths, Comment, CommentList, ListChange};
use realtime_rx::memory::{MemoryDatabase, MemoryDatabaseOptions};
use realtime_rx::query::{ChildEvent, Observed};
use realtime_rx::service::DatabaseReference;
use serde_json::json;

/// Route library logs to the test harness; `RUST_LOG` selects the level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Seeded with push-style keys so stored order matches arrival order.
fn context() -> (MemoryDatabase, AppContext) {
    let db = MemoryDatabase::with_options(MemoryDatabaseOptions {
        seed: json!({
            "users": { "u1": { "username": "ann", "email": "ann@example.com" } },
            "post-comments": {
                "p1": {
                    "-A1": { "uid": "u2", "author": "bob", "text": "first" },
                    "-A2": { "uid": "u3", "author": "cy", "text": "second" }
                }
            }
        }),
        ..Default::default()
    });
    let ctx = AppContext::new(db.root(), "u1", AppPaths::default());
    (db, ctx)
}

fn apply_ready(
    list: &mut CommentList,
    stream: &mut Observed<ChildEvent<Comment>>,
) -> Vec<ListChange> {
    let mut changes = Vec::new();
    while let Some(Some(item)) = stream.next().now_or_never() {
        changes.push(list.apply(item.unwrap()));
    }
    changes
}

#[test]
fn existing_comments_load_in_order() {
    let (_db, ctx) = context();
    let mut stream = ctx.watch_comments("p1").unwrap();
    let mut list = CommentList::new();

    assert_eq!(
        apply_ready(&mut list, &mut stream),
        vec![ListChange::Inserted(0), ListChange::Inserted(1)]
    );
    let texts: Vec<_> = list.values().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[test]
fn new_edited_and_deleted_comments_update_the_list() {
    init_tracing();
    let (db, ctx) = context();
    let mut stream = ctx.watch_comments("p1").unwrap();
    let mut list = CommentList::new();
    apply_ready(&mut list, &mut stream);

    let key = futures::executor::block_on(ctx.post_comment("p1", "third")).unwrap();
    assert_eq!(apply_ready(&mut list, &mut stream), vec![ListChange::Inserted(2)]);
    assert_eq!(list.get(2).map(|(k, c)| (k, c.author.as_str())), Some((key.as_str(), "ann")));

    ctx.comments_ref("p1")
        .unwrap()
        .child("-A1/text")
        .unwrap()
        .set_value(json!("edited"));
    assert_eq!(apply_ready(&mut list, &mut stream), vec![ListChange::Changed(0)]);
    assert_eq!(list.get(0).unwrap().1.text, "edited");

    db.reference("/post-comments/p1/-A2").unwrap().remove_value();
    assert_eq!(apply_ready(&mut list, &mut stream), vec![ListChange::Removed(1)]);
    assert_eq!(list.len(), 2);
    assert_eq!(list.position(&key), Some(1));
}

#[test]
fn malformed_comment_ends_the_watch() {
    init_tracing();
    let (db, ctx) = context();
    let mut stream = ctx.watch_comments("p1").unwrap();
    let mut list = CommentList::new();
    apply_ready(&mut list, &mut stream);

    db.reference("/post-comments/p1/-A3").unwrap().set_value(json!("just text"));
    assert!(matches!(stream.next().now_or_never(), Some(Some(Err(_)))));
    assert!(stream.is_unsubscribed());
    assert_eq!(db.listener_count(), 0);
}
