//! Configuration for signing and verification.

use std::fmt;
use std::sync::Arc;

use crate::key::SecretKey;
use crate::serializer::{JsonSerializer, Serializer};

/// Configuration for [`dumps`](crate::dumps) and [`loads`](crate::loads).
#[derive(Clone)]
pub struct SigningConfig {
    /// Application secret.
    pub key: Arc<SecretKey>,
    /// Namespace mixed into the HMAC key. Values signed with one salt never
    /// verify under another.
    pub salt: String,
    /// Serializer for the payload.
    pub serializer: Arc<dyn Serializer>,
    /// Try to zlib-compress the payload.
    pub compress: bool,
}

impl SigningConfig {
    /// Create a new config with the JSON serializer and no compression.
    pub fn new(key: impl Into<Arc<SecretKey>>, salt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            salt: salt.into(),
            serializer: Arc::new(JsonSerializer),
            compress: false,
        }
    }

    /// Set the payload serializer.
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Enable or disable compression.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("key", &self.key)
            .field("salt", &self.salt)
            .field("compress", &self.compress)
            .finish_non_exhaustive()
    }
}
