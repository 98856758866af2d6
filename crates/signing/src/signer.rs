//! HMAC-SHA1 signing with constant-time verification.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

use crate::encoding::{b62_decode, b62_encode, b64_encode};
use crate::error::{Result, SigningError};
use crate::key::SecretKey;

type HmacSha1 = Hmac<Sha1>;

/// Separator between the value, the timestamp and the signature.
pub const SEP: char = ':';

/// Salts used in place of an empty one, named after the signer class of the
/// signed-cookie format these strings interoperate with.
const SIGNER_DEFAULT_SALT: &str = "django.core.signing.Signer";
const TIMESTAMP_SIGNER_DEFAULT_SALT: &str = "django.core.signing.TimestampSigner";

/// Time since the Unix epoch, zero if the clock is before it.
pub fn unix_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Compute an HMAC-SHA1 whose key is derived from `key_salt` and the secret.
///
/// The derived key is `SHA1(key_salt || secret)`, so two salts never share
/// a MAC key even with the same secret.
fn salted_hmac(key_salt: &str, value: &[u8], secret: &SecretKey) -> Vec<u8> {
    let mut hasher = Sha1::new();
    hasher.update(key_salt.as_bytes());
    hasher.update(secret.as_bytes());
    let key = hasher.finalize();

    let mut mac = HmacSha1::new_from_slice(&key).expect("HMAC accepts keys of any length");
    mac.update(value);
    mac.finalize().into_bytes().to_vec()
}

/// Appends and verifies a salted signature.
#[derive(Debug, Clone, Copy)]
pub struct Signer<'a> {
    key: &'a SecretKey,
    salt: &'a str,
}

impl<'a> Signer<'a> {
    /// An empty `salt` is replaced with a fixed default.
    pub fn new(key: &'a SecretKey, salt: &'a str) -> Self {
        Self::with_default_salt(key, salt, SIGNER_DEFAULT_SALT)
    }

    fn with_default_salt(key: &'a SecretKey, salt: &'a str, default: &'static str) -> Self {
        let salt = if salt.is_empty() { default } else { salt };
        Self { key, salt }
    }

    /// Base64url signature of `value`.
    pub fn signature(&self, value: &str) -> String {
        let key_salt = format!("{}signer", self.salt);
        b64_encode(&salted_hmac(&key_salt, value.as_bytes(), self.key))
    }

    pub fn sign(&self, value: &str) -> String {
        format!("{}{}{}", value, SEP, self.signature(value))
    }

    /// Verify the trailing signature and return the signed value.
    pub fn unsign<'v>(&self, signed: &'v str) -> Result<&'v str> {
        let (value, signature) = signed
            .rsplit_once(SEP)
            .ok_or(SigningError::MissingSeparator)?;

        let expected = self.signature(value);
        // Constant-time comparison to prevent timing attacks
        if bool::from(signature.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(value)
        } else {
            Err(SigningError::BadSignature)
        }
    }
}

/// A [`Signer`] that also embeds the signing time and enforces a max age.
#[derive(Debug, Clone, Copy)]
pub struct TimestampSigner<'a> {
    signer: Signer<'a>,
}

impl<'a> TimestampSigner<'a> {
    /// An empty `salt` is replaced with a fixed default, distinct from the
    /// one [`Signer::new`] uses.
    pub fn new(key: &'a SecretKey, salt: &'a str) -> Self {
        Self {
            signer: Signer::with_default_salt(key, salt, TIMESTAMP_SIGNER_DEFAULT_SALT),
        }
    }

    /// Sign `value` with the current time.
    pub fn sign(&self, value: &str) -> String {
        self.sign_at(value, unix_now().as_secs())
    }

    /// Sign `value` as if at `timestamp` seconds since the epoch.
    pub fn sign_at(&self, value: &str, timestamp: u64) -> String {
        let value = format!("{}{}{}", value, SEP, b62_encode(timestamp));
        self.signer.sign(&value)
    }

    /// Verify against the current time.
    pub fn unsign<'v>(&self, signed: &'v str, max_age: Option<Duration>) -> Result<&'v str> {
        self.unsign_at(signed, max_age, unix_now())
    }

    /// Verify the signature, then reject values older than `max_age` as
    /// seen at `now` (time since the epoch).
    ///
    /// The age is fractional while the embedded timestamp is whole seconds,
    /// so a max age of zero rejects everything signed before `now`.
    pub fn unsign_at<'v>(
        &self,
        signed: &'v str,
        max_age: Option<Duration>,
        now: Duration,
    ) -> Result<&'v str> {
        let result = self.signer.unsign(signed)?;
        let (value, timestamp) = result
            .rsplit_once(SEP)
            .ok_or(SigningError::MissingSeparator)?;
        let timestamp = b62_decode(timestamp)?;

        if let Some(max_age) = max_age {
            let age = now.as_secs_f64() - timestamp as f64;
            if age > max_age.as_secs_f64() {
                return Err(SigningError::Expired { age, max_age });
            }
        }

        Ok(value)
    }
}
