//! Tamper-evident, time-bound encoding of structured data.
//!
//! This crate provides functionality for:
//! - Serializing a JSON value, optionally zlib-compressing it
//! - Timestamping and HMAC-SHA1 signing the encoded payload
//! - Verifying, expiring and decoding signed strings
//!
//! # Format
//!
//! Signed strings follow the format: `{base64url(payload)}:{base62(timestamp)}:{base64url(signature)}`
//!
//! Example: `eyJ5ZWFyIjoyMDE5fQ:1r31eq:V0y0vyi-bzIykHDloXuyYqdNtfY`
//!
//! A compressed payload is prefixed with `.`. The layout and the key
//! derivation match Django's `django.core.signing.dumps`, so strings issued
//! by either side can be verified by the other when they share a secret.
//!
//! # Security Features
//!
//! - HMAC key derived from the salt, so different salts never share signatures
//! - Constant-time signature comparison
//! - Memory zeroization of the secret key
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use serde_json::json;
//! use signing::{SecretKey, SigningConfig, dumps, loads};
//!
//! let config = SigningConfig::new(SecretKey::from("not-so-secret"), "greetings");
//! let signed = dumps(&json!({"year": 2019}), &config).unwrap();
//!
//! let value = loads(&signed, &config, Some(Duration::from_secs(300))).unwrap();
//! assert_eq!(value["year"], 2019);
//! ```

mod codec;
mod config;
mod encoding;
mod error;
mod key;
mod serializer;
mod signer;

// Public re-exports
pub use codec::{dumps, dumps_at, loads, loads_at};
pub use config::SigningConfig;
pub use encoding::{b62_decode, b62_encode, b64_decode, b64_encode};
pub use error::{Failure, Result, SigningError};
pub use key::SecretKey;
pub use serializer::{JsonSerializer, Serializer};
pub use signer::{SEP, Signer, TimestampSigner, unix_now};
