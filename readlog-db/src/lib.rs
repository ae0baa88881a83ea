//! readlog-db: PostgreSQL persistence for readlog-core.
//!
//! Provides the connection pool, schema migrations, and a
//! [`PgReadLogStore`] implementing [`readlog_core::ReadLogStore`] over
//! `sqlx::PgPool`.

pub mod migrations;
pub mod pg;
pub mod pool;

pub use pg::PgReadLogStore;
pub use pool::create_pool;
