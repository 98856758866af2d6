//! Error types for signing operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while signing or verifying a value.
#[derive(Debug, Error)]
pub enum SigningError {
    /// Signed value has no separator to split off a signature or timestamp
    #[error("No \":\" found in value")]
    MissingSeparator,

    /// Signature doesn't match the recomputed one
    #[error("Signature does not match")]
    BadSignature,

    /// Signature is valid but older than the allowed max age
    #[error("Signature age {age:.3}s > {max_age:?}")]
    Expired { age: f64, max_age: Duration },

    /// Base64 decoding failed
    #[error("Invalid base64 encoding")]
    InvalidEncoding,

    /// Base62 timestamp decoding failed
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// zlib compression or decompression failed
    #[error("Compression failed: {0}")]
    Compression(#[from] std::io::Error),

    /// Serializer could not turn the value into bytes or back
    #[error("Serialization failed: {0}")]
    Serialization(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of a verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The input is not shaped like a signed value.
    Malformed,
    /// The signature was forged or the value was tampered with.
    BadSignature,
    /// The signature is genuine but too old.
    Expired,
}

impl SigningError {
    /// Classify this error into one of the three verification outcomes.
    pub fn failure(&self) -> Failure {
        match self {
            SigningError::BadSignature => Failure::BadSignature,
            SigningError::Expired { .. } => Failure::Expired,
            _ => Failure::Malformed,
        }
    }

    /// Wrap any serializer error.
    pub fn serialization(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SigningError::Serialization(Box::new(err))
    }
}

/// Result type alias for signing operations.
pub type Result<T> = std::result::Result<T, SigningError>;
