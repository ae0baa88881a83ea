//! Storage boundary for the read-position log tables.
//!
//! Every method maps onto a single statement against the backing store;
//! atomicity within one statement is the store's responsibility, and no
//! atomicity is promised across statements (see [`crate::ReadStateTracker`]
//! for the accepted inconsistency window).

use async_trait::async_trait;

use crate::error::StoreError;
use crate::marks::{BoardReadMark, TopicReadMark, TopicSummary};
use crate::{BoardId, MemberId, MsgId, TopicId};

/// Relational storage for board/topic read marks.
///
/// Implementations must provide insert-or-replace semantics for the upsert
/// methods, keyed on (member, board) or (member, topic), and tolerate
/// concurrent callers via their own row-level concurrency control.
#[async_trait]
pub trait ReadLogStore: Send + Sync {
    /// Delete the member's board marks and mark-read ledger rows for the
    /// given boards. Returns the number of rows removed.
    async fn delete_board_marks(
        &self,
        member: MemberId,
        boards: &[BoardId],
    ) -> Result<u64, StoreError>;

    /// Upsert one board mark per board, all at `watermark`.
    async fn upsert_board_marks(
        &self,
        member: MemberId,
        boards: &[BoardId],
        watermark: MsgId,
    ) -> Result<(), StoreError>;

    /// Mirror the same upsert into the coarse mark-read ledger.
    async fn upsert_mark_read(
        &self,
        member: MemberId,
        boards: &[BoardId],
        watermark: MsgId,
    ) -> Result<(), StoreError>;

    /// Lowest topic id among the member's topic marks, system-wide.
    async fn lowest_topic_mark(&self, member: MemberId) -> Result<Option<TopicId>, StoreError>;

    /// Forward scan of the member's topic marks with `id_topic >= floor`
    /// whose owning board is in `boards`, joined against topic metadata.
    async fn topic_marks_in_boards(
        &self,
        member: MemberId,
        floor: TopicId,
        boards: &[BoardId],
    ) -> Result<Vec<TopicReadMark>, StoreError>;

    /// Batched rewrite of the member's topic marks to `watermark`, with the
    /// unwatch flag set uniformly across the batch.
    async fn upsert_topic_marks(
        &self,
        member: MemberId,
        topics: &[TopicId],
        watermark: MsgId,
        unwatched: bool,
    ) -> Result<(), StoreError>;

    /// Delete the member's topic marks for the given topics. Returns the
    /// number of rows removed.
    async fn delete_topic_marks(
        &self,
        member: MemberId,
        topics: &[TopicId],
    ) -> Result<u64, StoreError>;

    /// The member's board marks restricted to `boards`.
    async fn board_marks(
        &self,
        member: MemberId,
        boards: &[BoardId],
    ) -> Result<Vec<BoardReadMark>, StoreError>;

    /// The member's topic mark for a single topic, if any.
    async fn topic_mark(
        &self,
        member: MemberId,
        topic: TopicId,
    ) -> Result<Option<TopicReadMark>, StoreError>;

    /// Metadata for a single topic, if the topic exists.
    async fn topic_summary(&self, topic: TopicId) -> Result<Option<TopicSummary>, StoreError>;

    /// Metadata for every topic in the given boards.
    async fn topics_in_boards(&self, boards: &[BoardId])
        -> Result<Vec<TopicSummary>, StoreError>;
}
