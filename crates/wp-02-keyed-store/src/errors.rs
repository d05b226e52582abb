//! Store error types.

use thiserror::Error;

/// Errors surfaced by a [`crate::ports::KeyedStore`] backend.
///
/// Lookup misses are NOT errors: `get` returns `Ok(None)` and callers
/// treat it as the expected store-then-wait outcome.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing database rejected or failed the operation.
    #[error("store backend error: {message}")]
    Backend { message: String },

    /// The store was closed while an operation was in flight.
    #[error("store closed")]
    Closed,
}

impl StoreError {
    /// Wrap a backend failure message.
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
        }
    }
}
