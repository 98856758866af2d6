//! Tokens for safely passing data through an untrusted medium.
//!
//! This crate provides two interchangeable token kinds:
//! - Stateless HMAC tokens: the data is signed, timestamped and encoded
//!   into the key itself
//! - Stateful cache tokens: the data is kept in an ephemeral store and the
//!   key is a random lookup handle, deleted on redemption
//!
//! # Lifecycle
//!
//! 1. Build a token with any data fields.
//! 2. Hand `token.key(&tokens)?` to the untrusted party (URL, email, form).
//! 3. Later, `MyToken::from_key(&tokens, &key)` rebuilds the token or fails
//!    with [`TokenError::DoesNotExist`].
//!
//! # Configuration
//!
//! Every setting is resolved per call from, in order: the token type's
//! override, the [`Settings`] held by the [`Tokens`] context, the built-in
//! [`defaults`](config::defaults).
//!
//! # Example
//!
//! ```rust
//! use tokens::{HmacToken, Settings, Stateless, Token, TokenData, Tokens};
//!
//! struct ResetToken {
//!     data: TokenData,
//! }
//!
//! impl ResetToken {
//!     fn new(user_id: u64) -> Self {
//!         Self { data: TokenData::new().with("user_id", user_id) }
//!     }
//! }
//!
//! impl Token for ResetToken {
//!     type Kind = Stateless;
//!
//!     fn data(&self) -> &TokenData {
//!         &self.data
//!     }
//!
//!     fn rehydrate(data: TokenData) -> Self {
//!         Self { data }
//!     }
//! }
//!
//! impl HmacToken for ResetToken {
//!     fn salt() -> Option<&'static str> {
//!         Some("password-reset")
//!     }
//! }
//!
//! let tokens = Tokens::new(Settings::new("change-me")).unwrap();
//! let key = ResetToken::new(1294).key(&tokens).unwrap();
//!
//! let token = ResetToken::from_key(&tokens, &key).unwrap();
//! assert_eq!(token.field::<u64>("user_id").unwrap(), 1294);
//! ```

pub mod config;
mod context;
mod data;
mod error;
pub mod security;
mod serializers;
mod stateful;
mod stateless;
pub mod store;
mod token;

#[cfg(test)]
mod testing;

// Public re-exports
pub use config::Settings;
pub use context::{Tokens, TokensBuilder};
pub use data::TokenData;
pub use error::{AlreadyUsed, ConfigError, FieldError, Result, TokenError};
pub use serializers::Serializers;
pub use signing::{JsonSerializer, SecretKey, Serializer};
pub use stateful::{CacheConfig, CacheToken, KeySlot, SimpleCacheToken, Stateful, random_key};
pub use stateless::{HmacConfig, HmacToken, SimpleHmacToken, Stateless};
pub use token::{Token, TokenKind};
