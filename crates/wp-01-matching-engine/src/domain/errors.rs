//! # Engine Errors

use thiserror::Error;
use wp_02_keyed_store::StoreError;

/// Errors surfaced by matching-engine operations.
///
/// Lookup misses, duplicate sends, and exhausted heuristics are NOT errors;
/// they resolve inside the flows. What reaches the caller is limited to
/// store I/O, codec failures, rejected input, and use after shutdown.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A store operation failed; correlation state is wherever the partial
    /// batch got to.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored record failed to (de)serialize.
    #[error("codec failure in namespace {namespace}: {reason}")]
    Codec {
        /// Namespace of the offending record.
        namespace: String,
        /// Underlying bincode message.
        reason: String,
    },

    /// The journey violates a structural invariant.
    #[error("invalid journey: {reason}")]
    InvalidJourney {
        /// Which invariant failed.
        reason: String,
    },

    /// The engine was stopped; no new operations are accepted.
    #[error("matching engine stopped")]
    Stopped,
}

impl MatchError {
    /// Wrap a codec failure.
    pub fn codec(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchError::Codec {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }
}
