//! # Error Types
//!
//! Decoding errors shared across subsystems.

use thiserror::Error;

/// Errors raised while decoding shared primitives.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// A payload field was not valid hex.
    #[error("invalid hex payload: {reason}")]
    InvalidHex { reason: String },

    /// A field required by the observation kind was absent.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}
