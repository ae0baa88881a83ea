//! Error types for readlog-core.
//!
//! Storage failures propagate to the caller unmodified: this layer adds no
//! translation, no retries, and no partial-failure compensation. The invoking
//! request handler decides user-visible behavior.

use thiserror::Error;

/// Error surfaced by [`crate::ReadLogStore`] implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Any failure from the storage backend (connectivity, constraint
    /// violation). Fatal to the current operation.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap a backend error without losing its source chain.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}
