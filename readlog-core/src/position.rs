//! Pure read-position resolution.
//!
//! A member's position on a topic is governed by whichever mark is present:
//! the coarse board-level mark, or a topic-level override carrying the
//! unwatch flag. [`is_topic_unread`] computes unread state from the resolved
//! position without touching storage.

use serde::{Deserialize, Serialize};

use crate::MsgId;

/// Resolved read position for one (member, topic) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadPosition {
    /// Only a board-level mark covers the topic.
    BoardLevel { watermark: MsgId },
    /// A topic-level override is present. The watermark is lifted to at
    /// least the board mark, so it is always the effective one.
    TopicLevel { watermark: MsgId, unwatched: bool },
}

impl ReadPosition {
    /// Resolve the governing position from the marks present, if any.
    ///
    /// `topic_mark` is `(watermark, unwatched)` from the member's topic-level
    /// row. When both marks exist the topic-level variant wins (it carries
    /// the unwatch flag), with its watermark raised to the board mark if the
    /// board mark is fresher.
    pub fn resolve(board_mark: Option<MsgId>, topic_mark: Option<(MsgId, bool)>) -> Option<Self> {
        match (board_mark, topic_mark) {
            (None, None) => None,
            (Some(watermark), None) => Some(Self::BoardLevel { watermark }),
            (board, Some((watermark, unwatched))) => Some(Self::TopicLevel {
                watermark: watermark.max(board.unwrap_or(0)),
                unwatched,
            }),
        }
    }

    /// Highest message id this position considers seen.
    pub fn watermark(&self) -> MsgId {
        match *self {
            Self::BoardLevel { watermark } => watermark,
            Self::TopicLevel { watermark, .. } => watermark,
        }
    }

    /// Whether the member has unwatched the topic.
    pub fn is_unwatched(&self) -> bool {
        matches!(*self, Self::TopicLevel { unwatched: true, .. })
    }
}

/// Is a topic with highest message `id_last_msg` unread for a member whose
/// marks are given? Absence of both marks is the unread state: any topic
/// with at least one message counts as unread.
pub fn is_topic_unread(
    board_mark: Option<MsgId>,
    topic_mark: Option<(MsgId, bool)>,
    id_last_msg: MsgId,
) -> bool {
    match ReadPosition::resolve(board_mark, topic_mark) {
        None => id_last_msg > 0,
        Some(position) => id_last_msg > position.watermark(),
    }
}
