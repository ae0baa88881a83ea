//! Schema migrations for the read-position log tables.

use sqlx::PgPool;

/// Create the log tables and indexes if they do not exist.
///
/// The `topics` table is normally owned by the host forum schema; it is
/// created here too so the subsystem is runnable standalone.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running readlog migrations...");

    // Board-level read marks: one row per (member, board)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS log_boards (
            id_member BIGINT NOT NULL,
            id_board BIGINT NOT NULL,
            id_msg BIGINT NOT NULL,
            PRIMARY KEY (id_member, id_board)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Coarse mark-read ledger, same shape as log_boards
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS log_mark_read (
            id_member BIGINT NOT NULL,
            id_board BIGINT NOT NULL,
            id_msg BIGINT NOT NULL,
            PRIMARY KEY (id_member, id_board)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Topic-level override marks, carrying the unwatch flag
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS log_topics (
            id_member BIGINT NOT NULL,
            id_topic BIGINT NOT NULL,
            id_msg BIGINT NOT NULL,
            unwatched BOOLEAN NOT NULL DEFAULT FALSE,
            PRIMARY KEY (id_member, id_topic)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Topic metadata joined during reconciliation
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            id_topic BIGINT PRIMARY KEY,
            id_board BIGINT NOT NULL,
            id_last_msg BIGINT NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("readlog migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_topics_board ON topics(id_board)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_log_topics_unwatched ON log_topics(id_member) WHERE unwatched",
    )
    .execute(pool)
    .await?;
    Ok(())
}
