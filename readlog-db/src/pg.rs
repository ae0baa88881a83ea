//! PostgreSQL implementation of [`ReadLogStore`].
//!
//! Batched upserts go through `UNNEST(...) ... ON CONFLICT DO UPDATE` so
//! each batch is a single statement; key-set deletes use `= ANY($n)`.
//! Atomicity holds per statement, never across statements.

use async_trait::async_trait;
use sqlx::PgPool;

use readlog_core::{
    BoardId, BoardReadMark, MemberId, MsgId, ReadLogStore, StoreError, TopicId, TopicReadMark,
    TopicSummary,
};

/// Read-mark storage over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgReadLogStore {
    pool: PgPool,
}

impl PgReadLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ReadLogStore for PgReadLogStore {
    async fn delete_board_marks(
        &self,
        member: MemberId,
        boards: &[BoardId],
    ) -> Result<u64, StoreError> {
        let marks = sqlx::query("DELETE FROM log_boards WHERE id_member = $1 AND id_board = ANY($2)")
            .bind(member)
            .bind(boards)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        let ledger =
            sqlx::query("DELETE FROM log_mark_read WHERE id_member = $1 AND id_board = ANY($2)")
                .bind(member)
                .bind(boards)
                .execute(&self.pool)
                .await
                .map_err(StoreError::backend)?;
        Ok(marks.rows_affected() + ledger.rows_affected())
    }

    async fn upsert_board_marks(
        &self,
        member: MemberId,
        boards: &[BoardId],
        watermark: MsgId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO log_boards (id_member, id_board, id_msg)
            SELECT $1, board, $2 FROM UNNEST($3::BIGINT[]) AS board
            ON CONFLICT (id_member, id_board) DO UPDATE SET id_msg = EXCLUDED.id_msg
            "#,
        )
        .bind(member)
        .bind(watermark)
        .bind(boards)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn upsert_mark_read(
        &self,
        member: MemberId,
        boards: &[BoardId],
        watermark: MsgId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO log_mark_read (id_member, id_board, id_msg)
            SELECT $1, board, $2 FROM UNNEST($3::BIGINT[]) AS board
            ON CONFLICT (id_member, id_board) DO UPDATE SET id_msg = EXCLUDED.id_msg
            "#,
        )
        .bind(member)
        .bind(watermark)
        .bind(boards)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn lowest_topic_mark(&self, member: MemberId) -> Result<Option<TopicId>, StoreError> {
        let row: (Option<i64>,) =
            sqlx::query_as("SELECT MIN(id_topic) FROM log_topics WHERE id_member = $1")
                .bind(member)
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::backend)?;
        Ok(row.0)
    }

    async fn topic_marks_in_boards(
        &self,
        member: MemberId,
        floor: TopicId,
        boards: &[BoardId],
    ) -> Result<Vec<TopicReadMark>, StoreError> {
        let rows: Vec<(i64, i64, i64, bool)> = sqlx::query_as(
            r#"
            SELECT lt.id_member, lt.id_topic, lt.id_msg, lt.unwatched
            FROM log_topics lt
            JOIN topics t ON t.id_topic = lt.id_topic
            WHERE lt.id_member = $1 AND lt.id_topic >= $2 AND t.id_board = ANY($3)
            ORDER BY lt.id_topic
            "#,
        )
        .bind(member)
        .bind(floor)
        .bind(boards)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(rows
            .into_iter()
            .map(|(id_member, id_topic, id_msg, unwatched)| TopicReadMark {
                id_member,
                id_topic,
                id_msg,
                unwatched,
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
        sqlx::query(
            r#"
            INSERT INTO log_topics (id_member, id_topic, id_msg, unwatched)
            SELECT $1, topic, $2, $3 FROM UNNEST($4::BIGINT[]) AS topic
            ON CONFLICT (id_member, id_topic)
            DO UPDATE SET id_msg = EXCLUDED.id_msg, unwatched = EXCLUDED.unwatched
            "#,
        )
        .bind(member)
        .bind(watermark)
        .bind(unwatched)
        .bind(topics)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn delete_topic_marks(
        &self,
        member: MemberId,
        topics: &[TopicId],
    ) -> Result<u64, StoreError> {
        let result =
            sqlx::query("DELETE FROM log_topics WHERE id_member = $1 AND id_topic = ANY($2)")
                .bind(member)
                .bind(topics)
                .execute(&self.pool)
                .await
                .map_err(StoreError::backend)?;
        Ok(result.rows_affected())
    }

    async fn board_marks(
        &self,
        member: MemberId,
        boards: &[BoardId],
    ) -> Result<Vec<BoardReadMark>, StoreError> {
        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT id_member, id_board, id_msg
            FROM log_boards
            WHERE id_member = $1 AND id_board = ANY($2)
            ORDER BY id_board
            "#,
        )
        .bind(member)
        .bind(boards)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(rows
            .into_iter()
            .map(|(id_member, id_board, id_msg)| BoardReadMark {
                id_member,
                id_board,
                id_msg,
            })
            .collect())
    }

    async fn topic_mark(
        &self,
        member: MemberId,
        topic: TopicId,
    ) -> Result<Option<TopicReadMark>, StoreError> {
        let row: Option<(i64, i64, i64, bool)> = sqlx::query_as(
            "SELECT id_member, id_topic, id_msg, unwatched FROM log_topics WHERE id_member = $1 AND id_topic = $2",
        )
        .bind(member)
        .bind(topic)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|(id_member, id_topic, id_msg, unwatched)| TopicReadMark {
            id_member,
            id_topic,
            id_msg,
            unwatched,
        }))
    }

    async fn topic_summary(&self, topic: TopicId) -> Result<Option<TopicSummary>, StoreError> {
        let row: Option<(i64, i64, i64)> = sqlx::query_as(
            "SELECT id_topic, id_board, id_last_msg FROM topics WHERE id_topic = $1",
        )
        .bind(topic)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|(id_topic, id_board, id_last_msg)| TopicSummary {
            id_topic,
            id_board,
            id_last_msg,
        }))
    }

    async fn topics_in_boards(
        &self,
        boards: &[BoardId],
    ) -> Result<Vec<TopicSummary>, StoreError> {
        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT id_topic, id_board, id_last_msg
            FROM topics
            WHERE id_board = ANY($1)
            ORDER BY id_topic
            "#,
        )
        .bind(boards)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(rows
            .into_iter()
            .map(|(id_topic, id_board, id_last_msg)| TopicSummary {
                id_topic,
                id_board,
                id_last_msg,
            })
            .collect())
    }
}
