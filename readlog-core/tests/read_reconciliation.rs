//! End-to-end reconciliation behavior over the in-memory store.

use readlog_core::memory::MemoryReadLogStore;
use readlog_core::{ReadLogStore, ReadStateTracker};

/// Two boards, three topics, some history.
fn seeded_tracker() -> ReadStateTracker<MemoryReadLogStore> {
    let store = MemoryReadLogStore::new();
    store.insert_topic(7, 2);
    store.insert_topic(8, 2);
    store.insert_topic(9, 3);
    store.post_message(7, 150);
    store.post_message(8, 90);
    store.post_message(9, 140);
    ReadStateTracker::new(store)
}

#[tokio::test]
async fn mark_unread_makes_every_topic_unread() {
    let tracker = seeded_tracker();
    tracker.mark_read(5, &[2, 3], 200, false, false).await.unwrap();
    assert!(tracker.unread_topics(5, &[2, 3]).await.unwrap().is_empty());

    tracker.mark_unread(5, &[2, 3]).await.unwrap();
    assert_eq!(tracker.unread_topics(5, &[2, 3]).await.unwrap(), vec![7, 8, 9]);
}

#[tokio::test]
async fn mark_read_then_unread_round_trips() {
    let tracker = seeded_tracker();
    let before = tracker.unread_topics(5, &[2]).await.unwrap();
    assert_eq!(before, vec![7, 8]);

    tracker.mark_read(5, &[2], 150, false, false).await.unwrap();
    assert!(tracker.unread_topics(5, &[2]).await.unwrap().is_empty());

    tracker.mark_read(5, &[2], 150, true, false).await.unwrap();
    assert_eq!(tracker.unread_topics(5, &[2]).await.unwrap(), before);
}

#[tokio::test]
async fn mark_read_is_idempotent_at_same_watermark() {
    let tracker = seeded_tracker();
    tracker.store().set_topic_mark(5, 7, 80, true);
    tracker.store().set_topic_mark(5, 8, 80, false);

    tracker.mark_read(5, &[2], 150, false, true).await.unwrap();
    let first = tracker.store().dump();

    tracker.mark_read(5, &[2], 150, false, true).await.unwrap();
    assert_eq!(tracker.store().dump(), first);
}

#[tokio::test]
async fn reset_mirrors_board_marks_into_ledger() {
    let tracker = seeded_tracker();

    // without reset_topics the coarse ledger stays untouched
    tracker.mark_read(5, &[2], 100, false, false).await.unwrap();
    assert!(tracker.store().dump().mark_read.is_empty());

    tracker.mark_read(5, &[2, 3], 150, false, true).await.unwrap();
    let snapshot = tracker.store().dump();
    assert_eq!(snapshot.mark_read, snapshot.board_marks);
    assert_eq!(snapshot.mark_read.len(), 2);
    assert!(snapshot.mark_read.iter().all(|m| m.id_msg == 150));
}

#[tokio::test]
async fn duplicate_board_ids_collapse_to_one_row() {
    let tracker = seeded_tracker();
    tracker.mark_read(5, &[2, 2, 2], 150, false, false).await.unwrap();
    let snapshot = tracker.store().dump();
    assert_eq!(snapshot.board_marks.len(), 1);
    assert_eq!(snapshot.board_marks[0].id_board, 2);
    assert_eq!(snapshot.board_marks[0].id_msg, 150);
}

#[tokio::test]
async fn unwatched_mark_survives_reset_with_bumped_watermark() {
    let tracker = seeded_tracker();
    tracker.store().set_topic_mark(5, 7, 80, true);

    tracker.mark_read(5, &[2], 150, false, true).await.unwrap();

    let mark = tracker.store().topic_mark(5, 7).await.unwrap().unwrap();
    assert!(mark.unwatched);
    assert_eq!(mark.id_msg, 150);
}

#[tokio::test]
async fn watched_mark_is_deleted_by_reset() {
    let tracker = seeded_tracker();
    tracker.store().set_topic_mark(5, 7, 80, false);

    tracker.mark_read(5, &[2], 150, false, true).await.unwrap();

    assert!(tracker.store().topic_mark(5, 7).await.unwrap().is_none());
}

#[tokio::test]
async fn reset_leaves_other_boards_topic_marks_alone() {
    let tracker = seeded_tracker();
    // topic 9 lives in board 3, outside the marked set
    tracker.store().set_topic_mark(5, 9, 80, false);

    tracker.mark_read(5, &[2], 150, false, true).await.unwrap();

    let mark = tracker.store().topic_mark(5, 9).await.unwrap().unwrap();
    assert_eq!(mark.id_msg, 80);
}

#[tokio::test]
async fn new_message_past_watermark_then_fresh_mark_read() {
    let tracker = seeded_tracker();
    tracker.mark_read(5, &[2], 100, false, false).await.unwrap();

    // message 150 already sits in topic 7, past the watermark of 100
    assert!(tracker.is_topic_unread(5, 7).await.unwrap());

    tracker.mark_read(5, &[2], 150, false, true).await.unwrap();
    assert!(!tracker.is_topic_unread(5, 7).await.unwrap());
}

#[tokio::test]
async fn empty_board_set_changes_nothing() {
    let tracker = seeded_tracker();
    tracker.store().set_topic_mark(5, 7, 80, true);
    tracker.mark_read(5, &[2], 100, false, false).await.unwrap();
    let before = tracker.store().dump();

    tracker.mark_read(5, &[], 150, false, true).await.unwrap();
    assert_eq!(tracker.store().dump(), before);

    tracker.mark_unread(5, &[]).await.unwrap();
    assert_eq!(tracker.store().dump(), before);
}

#[tokio::test]
async fn unread_branch_ignores_reset_topics() {
    let tracker = seeded_tracker();
    tracker.store().set_topic_mark(5, 7, 80, true);
    tracker.mark_read(5, &[2], 100, false, false).await.unwrap();

    // reset_topics has no effect when marking unread: board rows go away,
    // the topic mark stays exactly as it was
    tracker.mark_read(5, &[2], 150, true, true).await.unwrap();

    let snapshot = tracker.store().dump();
    assert!(snapshot.board_marks.is_empty());
    assert!(snapshot.mark_read.is_empty());
    let mark = tracker.store().topic_mark(5, 7).await.unwrap().unwrap();
    assert_eq!(mark.id_msg, 80);
    assert!(mark.unwatched);
}

#[tokio::test]
async fn members_do_not_interfere() {
    let tracker = seeded_tracker();
    tracker.mark_read(5, &[2], 150, false, false).await.unwrap();

    assert!(tracker.unread_topics(5, &[2]).await.unwrap().is_empty());
    assert_eq!(tracker.unread_topics(6, &[2]).await.unwrap(), vec![7, 8]);
}

#[tokio::test]
async fn topic_jump_reads_ahead_of_board_mark() {
    let tracker = seeded_tracker();
    tracker.mark_read(5, &[2], 90, false, false).await.unwrap();
    // the member opened topic 7 directly and read to its end
    tracker.store().set_topic_mark(5, 7, 150, false);

    assert!(!tracker.is_topic_unread(5, 7).await.unwrap());
    assert_eq!(tracker.unread_topics(5, &[2]).await.unwrap(), Vec::<i64>::new());
}
