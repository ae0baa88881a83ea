//! In-memory [`ReadLogStore`] for tests and embedded use.
//!
//! Backs the integration test suite so reconciliation semantics can be
//! exercised without a database. [`MemoryReadLogStore::dump`] snapshots the
//! three log tables for table-state equality assertions.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::marks::{BoardReadMark, TopicReadMark, TopicSummary};
use crate::store::ReadLogStore;
use crate::{BoardId, MemberId, MsgId, TopicId};

#[derive(Debug, Default)]
struct Tables {
    /// log_boards: (member, board) -> watermark
    board_marks: BTreeMap<(MemberId, BoardId), MsgId>,
    /// log_mark_read: same shape as log_boards
    mark_read: BTreeMap<(MemberId, BoardId), MsgId>,
    /// log_topics: (member, topic) -> (watermark, unwatched)
    topic_marks: BTreeMap<(MemberId, TopicId), (MsgId, bool)>,
    /// topics: topic -> (board, last message id)
    topics: BTreeMap<TopicId, (BoardId, MsgId)>,
}

/// In-memory store with seeding helpers for test setup.
#[derive(Debug, Default)]
pub struct MemoryReadLogStore {
    tables: Mutex<Tables>,
}

/// Snapshot of the three log tables, ordered by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub board_marks: Vec<BoardReadMark>,
    pub mark_read: Vec<BoardReadMark>,
    pub topic_marks: Vec<TopicReadMark>,
}

impl MemoryReadLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a topic under a board. Topics start empty.
    pub fn insert_topic(&self, topic: TopicId, board: BoardId) {
        let mut t = self.tables.lock().unwrap();
        t.topics.entry(topic).or_insert((board, 0));
    }

    /// Record a message posted in a topic; the topic's last message id only
    /// moves forward.
    pub fn post_message(&self, topic: TopicId, msg: MsgId) {
        let mut t = self.tables.lock().unwrap();
        if let Some((_, last)) = t.topics.get_mut(&topic) {
            *last = (*last).max(msg);
        }
    }

    /// Seed a topic-level mark directly, bypassing the tracker.
    pub fn set_topic_mark(&self, member: MemberId, topic: TopicId, msg: MsgId, unwatched: bool) {
        let mut t = self.tables.lock().unwrap();
        t.topic_marks.insert((member, topic), (msg, unwatched));
    }

    /// Snapshot current table state for equality assertions.
    pub fn dump(&self) -> StoreSnapshot {
        let t = self.tables.lock().unwrap();
        StoreSnapshot {
            board_marks: t
                .board_marks
                .iter()
                .map(|(&(id_member, id_board), &id_msg)| BoardReadMark {
                    id_member,
                    id_board,
                    id_msg,
                })
                .collect(),
            mark_read: t
                .mark_read
                .iter()
                .map(|(&(id_member, id_board), &id_msg)| BoardReadMark {
                    id_member,
                    id_board,
                    id_msg,
                })
                .collect(),
            topic_marks: t
                .topic_marks
                .iter()
                .map(|(&(id_member, id_topic), &(id_msg, unwatched))| TopicReadMark {
                    id_member,
                    id_topic,
                    id_msg,
                    unwatched,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ReadLogStore for MemoryReadLogStore {
    async fn delete_board_marks(
        &self,
        member: MemberId,
        boards: &[BoardId],
    ) -> Result<u64, StoreError> {
        let mut t = self.tables.lock().unwrap();
        let mut removed = 0u64;
        for &board in boards {
            if t.board_marks.remove(&(member, board)).is_some() {
                removed += 1;
            }
            if t.mark_read.remove(&(member, board)).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn upsert_board_marks(
        &self,
        member: MemberId,
        boards: &[BoardId],
        watermark: MsgId,
    ) -> Result<(), StoreError> {
        let mut t = self.tables.lock().unwrap();
        for &board in boards {
            t.board_marks.insert((member, board), watermark);
        }
        Ok(())
    }

    async fn upsert_mark_read(
        &self,
        member: MemberId,
        boards: &[BoardId],
        watermark: MsgId,
    ) -> Result<(), StoreError> {
        let mut t = self.tables.lock().unwrap();
        for &board in boards {
            t.mark_read.insert((member, board), watermark);
        }
        Ok(())
    }

    async fn lowest_topic_mark(&self, member: MemberId) -> Result<Option<TopicId>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.topic_marks
            .range((member, TopicId::MIN)..=(member, TopicId::MAX))
            .map(|(&(_, topic), _)| topic)
            .next())
    }

    async fn topic_marks_in_boards(
        &self,
        member: MemberId,
        floor: TopicId,
        boards: &[BoardId],
    ) -> Result<Vec<TopicReadMark>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.topic_marks
            .range((member, floor)..=(member, TopicId::MAX))
            .filter_map(|(&(id_member, id_topic), &(id_msg, unwatched))| {
                let (board, _) = t.topics.get(&id_topic)?;
                boards.contains(board).then_some(TopicReadMark {
                    id_member,
                    id_topic,
                    id_msg,
                    unwatched,
                })
            })
            .collect())
    }

    async fn upsert_topic_marks(
        &self,
        member: MemberId,
        topics: &[TopicId],
        watermark: MsgId,
        unwatched: bool,
    ) -> Result<(), StoreError> {
        let mut t = self.tables.lock().unwrap();
        for &topic in topics {
            t.topic_marks.insert((member, topic), (watermark, unwatched));
        }
        Ok(())
    }

    async fn delete_topic_marks(
        &self,
        member: MemberId,
        topics: &[TopicId],
    ) -> Result<u64, StoreError> {
        let mut t = self.tables.lock().unwrap();
        let mut removed = 0u64;
        for &topic in topics {
            if t.topic_marks.remove(&(member, topic)).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn board_marks(
        &self,
        member: MemberId,
        boards: &[BoardId],
    ) -> Result<Vec<BoardReadMark>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(boards
            .iter()
            .filter_map(|&id_board| {
                t.board_marks
                    .get(&(member, id_board))
                    .map(|&id_msg| BoardReadMark {
                        id_member: member,
                        id_board,
                        id_msg,
                    })
            })
            .collect())
    }

    async fn topic_mark(
        &self,
        member: MemberId,
        topic: TopicId,
    ) -> Result<Option<TopicReadMark>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.topic_marks
            .get(&(member, topic))
            .map(|&(id_msg, unwatched)| TopicReadMark {
                id_member: member,
                id_topic: topic,
                id_msg,
                unwatched,
            }))
    }

    async fn topic_summary(&self, topic: TopicId) -> Result<Option<TopicSummary>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.topics
            .get(&topic)
            .map(|&(id_board, id_last_msg)| TopicSummary {
                id_topic: topic,
                id_board,
                id_last_msg,
            }))
    }

    async fn topics_in_boards(
        &self,
        boards: &[BoardId],
    ) -> Result<Vec<TopicSummary>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.topics
            .iter()
            .filter(|(_, (board, _))| boards.contains(board))
            .map(|(&id_topic, &(id_board, id_last_msg))| TopicSummary {
                id_topic,
                id_board,
                id_last_msg,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn post_message_only_moves_forward() {
        let store = MemoryReadLogStore::new();
        store.insert_topic(1, 1);
        store.post_message(1, 10);
        store.post_message(1, 5);
        let summary = store.topic_summary(1).await.unwrap().unwrap();
        assert_eq!(summary.id_last_msg, 10);
    }

    #[tokio::test]
    async fn board_mark_upsert_replaces() {
        let store = MemoryReadLogStore::new();
        store.upsert_board_marks(1, &[2], 10).await.unwrap();
        store.upsert_board_marks(1, &[2], 20).await.unwrap();
        let marks = store.board_marks(1, &[2]).await.unwrap();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].id_msg, 20);
    }

    #[tokio::test]
    async fn lowest_topic_mark_is_member_scoped() {
        let store = MemoryReadLogStore::new();
        store.set_topic_mark(1, 7, 10, false);
        store.set_topic_mark(2, 3, 10, false);
        assert_eq!(store.lowest_topic_mark(1).await.unwrap(), Some(7));
        assert_eq!(store.lowest_topic_mark(3).await.unwrap(), None);
    }
}
