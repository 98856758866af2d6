//! Error types for token operations.

use signing::SigningError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by [`Token::key`](crate::Token::key) and
/// [`Token::from_key`](crate::Token::from_key).
#[derive(Debug, Error)]
pub enum TokenError {
    /// The external string doesn't redeem to a token: malformed, forged,
    /// expired, unknown, already consumed or rejected by the validity hook.
    /// Which one is deliberately not revealed.
    #[error("Token does not exist")]
    DoesNotExist,

    /// Configuration can't be resolved. Never recoverable by retrying.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The token data couldn't be serialized while issuing a key.
    #[error("Failed to encode token data: {0}")]
    Encode(#[source] SigningError),

    /// The ephemeral store failed while issuing a key.
    #[error("Failed to store token data: {0}")]
    Store(#[source] StoreError),
}

/// Fatal configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No secret key configured, or it is empty
    #[error("The secret_key setting must not be empty")]
    MissingSecretKey,

    /// Serializer name doesn't resolve to a registered serializer
    #[error("Unknown serializer: '{0}'")]
    UnknownSerializer(String),

    /// Cache name doesn't resolve to a registered store
    #[error("Unknown cache: '{0}'")]
    UnknownCache(String),

    /// Settings file couldn't be parsed
    #[error("Invalid settings: {0}")]
    Load(#[from] serde_yaml::Error),

    /// Settings file couldn't be read
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised by a validity hook to reject a token that was already acted on.
///
/// Translated into [`TokenError::DoesNotExist`] before it reaches callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Token already used")]
pub struct AlreadyUsed;

/// Errors accessing a token field by name.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The token carries no field with this name
    #[error("'{token}' has no field '{field}'")]
    Missing { token: &'static str, field: String },

    /// The field exists but doesn't deserialize into the requested type
    #[error("Field '{field}' of '{token}' has an unexpected type: {source}")]
    Invalid {
        token: &'static str,
        field: String,
        source: serde_json::Error,
    },
}

/// Result type alias for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;
