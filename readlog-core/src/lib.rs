//! readlog-core: per-member read/unread tracking for forum boards and topics.
//!
//! Reconciles three overlapping log tables (board marks, a coarse mark-read
//! ledger, and per-topic marks) into a single read position per member. The
//! storage backend is abstracted behind [`ReadLogStore`]; a PostgreSQL
//! implementation lives in `readlog-db`, and [`memory::MemoryReadLogStore`]
//! backs the test suite.

pub mod error;
pub mod marks;
pub mod memory;
pub mod position;
pub mod store;
pub mod tracker;

pub use error::StoreError;
pub use marks::{BoardReadMark, TopicReadMark, TopicSummary};
pub use position::{is_topic_unread, ReadPosition};
pub use store::ReadLogStore;
pub use tracker::ReadStateTracker;

/// Member identifier. Trusted integer from an authenticated caller context.
pub type MemberId = i64;

/// Board identifier.
pub type BoardId = i64;

/// Topic identifier. Assigned monotonically by the host forum.
pub type TopicId = i64;

/// Message identifier. Assigned monotonically; doubles as the watermark unit.
pub type MsgId = i64;
