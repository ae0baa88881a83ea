//! Read-state reconciliation across board and topic marks.
//!
//! All context is passed explicitly: the member, the board set, and the
//! watermark (the highest message id known system-wide at call time). There
//! is no ambient "current member" or "current max message" state.
//!
//! No atomicity is promised across the statements one operation issues. A
//! crash between the board-mark upsert and the topic reconciliation can
//! leave topic marks stale; that window is accepted because the board mark
//! is authoritative for unread computation whenever no finer topic mark
//! exists, so the next read-position query self-heals.

use std::collections::HashMap;

use tracing::debug;

use crate::error::StoreError;
use crate::position::is_topic_unread;
use crate::store::ReadLogStore;
use crate::{BoardId, MemberId, MsgId, TopicId};

/// Reconciles a member's read position across boards and topics.
pub struct ReadStateTracker<S> {
    store: S,
}

impl<S: ReadLogStore> ReadStateTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Revert the member's read position for `boards` to "nothing marked":
    /// deletes the board marks and mark-read ledger rows, so every topic in
    /// those boards reports unread again. No-op on an empty set.
    pub async fn mark_unread(
        &self,
        member: MemberId,
        boards: &[BoardId],
    ) -> Result<(), StoreError> {
        let boards = dedup(boards);
        if boards.is_empty() {
            return Ok(());
        }
        let removed = self.store.delete_board_marks(member, &boards).await?;
        debug!(member, boards = boards.len(), removed, "marked boards unread");
        Ok(())
    }

    /// Mark `boards` read up to `watermark` for the member.
    ///
    /// With `unread = true` this delegates entirely to [`Self::mark_unread`]
    /// and returns; `reset_topics` is ignored on that branch. This mirrors
    /// the long-standing caller contract: topic-level reconciliation only
    /// ever runs when marking read.
    ///
    /// With `reset_topics = true`, topic marks in the affected boards are
    /// reconciled against the fresh board marks: unwatched marks are
    /// rewritten to the new watermark with the flag preserved, watched marks
    /// are deleted as redundant.
    pub async fn mark_read(
        &self,
        member: MemberId,
        boards: &[BoardId],
        watermark: MsgId,
        unread: bool,
        reset_topics: bool,
    ) -> Result<(), StoreError> {
        if unread {
            return self.mark_unread(member, boards).await;
        }

        // Callers should deduplicate; do it again so the store never sees
        // redundant upsert rows.
        let boards = dedup(boards);
        if boards.is_empty() {
            return Ok(());
        }

        debug!(member, boards = boards.len(), watermark, "marking boards read");
        self.store
            .upsert_board_marks(member, &boards, watermark)
            .await?;

        if !reset_topics {
            return Ok(());
        }

        self.store
            .upsert_mark_read(member, &boards, watermark)
            .await?;

        // Topic ids are assigned monotonically, so nothing below the
        // member's oldest tracked topic can have a row to reconcile.
        let Some(floor) = self.store.lowest_topic_mark(member).await? else {
            return Ok(());
        };

        let marks = self
            .store
            .topic_marks_in_boards(member, floor, &boards)
            .await?;
        let (unwatched, watched): (Vec<_>, Vec<_>) =
            marks.into_iter().partition(|mark| mark.unwatched);

        let rewrite: Vec<TopicId> = unwatched.iter().map(|m| m.id_topic).collect();
        let delete: Vec<TopicId> = watched.iter().map(|m| m.id_topic).collect();

        // Skip empty batches rather than lean on the store tolerating no-op
        // bulk statements.
        if !rewrite.is_empty() {
            self.store
                .upsert_topic_marks(member, &rewrite, watermark, true)
                .await?;
        }
        if !delete.is_empty() {
            self.store.delete_topic_marks(member, &delete).await?;
        }
        debug!(
            member,
            rewritten = rewrite.len(),
            deleted = delete.len(),
            "reconciled topic marks"
        );
        Ok(())
    }

    /// Is a single topic unread for the member? Unknown topics report read.
    pub async fn is_topic_unread(
        &self,
        member: MemberId,
        topic: TopicId,
    ) -> Result<bool, StoreError> {
        let Some(summary) = self.store.topic_summary(topic).await? else {
            return Ok(false);
        };
        let board_mark = self
            .store
            .board_marks(member, &[summary.id_board])
            .await?
            .first()
            .map(|m| m.id_msg);
        let topic_mark = self
            .store
            .topic_mark(member, topic)
            .await?
            .map(|m| (m.id_msg, m.unwatched));
        Ok(is_topic_unread(board_mark, topic_mark, summary.id_last_msg))
    }

    /// Topic ids in `boards` whose last message exceeds the member's
    /// resolved read position, ascending.
    pub async fn unread_topics(
        &self,
        member: MemberId,
        boards: &[BoardId],
    ) -> Result<Vec<TopicId>, StoreError> {
        let boards = dedup(boards);
        if boards.is_empty() {
            return Ok(Vec::new());
        }
        let summaries = self.store.topics_in_boards(&boards).await?;
        if summaries.is_empty() {
            return Ok(Vec::new());
        }

        let board_marks: HashMap<BoardId, MsgId> = self
            .store
            .board_marks(member, &boards)
            .await?
            .into_iter()
            .map(|m| (m.id_board, m.id_msg))
            .collect();
        let topic_marks: HashMap<TopicId, (MsgId, bool)> = self
            .store
            .topic_marks_in_boards(member, 0, &boards)
            .await?
            .into_iter()
            .map(|m| (m.id_topic, (m.id_msg, m.unwatched)))
            .collect();

        let mut unread: Vec<TopicId> = summaries
            .into_iter()
            .filter(|s| {
                is_topic_unread(
                    board_marks.get(&s.id_board).copied(),
                    topic_marks.get(&s.id_topic).copied(),
                    s.id_last_msg,
                )
            })
            .map(|s| s.id_topic)
            .collect();
        unread.sort_unstable();
        Ok(unread)
    }
}

fn dedup(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
