//! Row models for the read-position log tables.
//!
//! All rows are keyed by member; the tables enforce at most one row per
//! (member, board) or (member, topic) pair, and upserts replace the prior
//! value.

use serde::{Deserialize, Serialize};

use crate::{BoardId, MemberId, MsgId, TopicId};

/// Board-level read mark: "member has read this board up to `id_msg`".
///
/// Shared by the `log_boards` table and the coarse `log_mark_read` ledger,
/// which has the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardReadMark {
    pub id_member: MemberId,
    pub id_board: BoardId,
    pub id_msg: MsgId,
}

/// Topic-level override mark, used when a topic needs finer granularity than
/// its board mark: the member unwatched it, or jumped ahead out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicReadMark {
    pub id_member: MemberId,
    pub id_topic: TopicId,
    pub id_msg: MsgId,
    /// Suppresses notifications for this topic regardless of new content.
    /// Must survive bulk board-level mark-read.
    pub unwatched: bool,
}

/// Topic metadata owned by the host forum, joined during reconciliation and
/// unread queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id_topic: TopicId,
    pub id_board: BoardId,
    /// Highest message id posted in the topic; 0 for an empty topic.
    pub id_last_msg: MsgId,
}
