//! Stateless tokens: all data travels inside the signed key.
//!
//! The key is the token data serialized, optionally compressed, base64url
//! encoded, timestamped and HMAC-SHA1 signed (see the `signing` crate).
//! Nothing is stored server-side, so these tokens are *not* single use
//! unless [`HmacToken::check_validity`] is overridden to reject tokens that
//! were already acted on, for example by comparing a last-login timestamp in
//! the data with the user's current one.

use std::sync::Arc;
use std::time::Duration;

use signing::{Serializer, SigningConfig};

use crate::config::{defaults, resolve};
use crate::context::Tokens;
use crate::data::TokenData;
use crate::error::{AlreadyUsed, ConfigError, Result, TokenError};
use crate::security::{self, SecurityWarning};
use crate::token::{Token, TokenKind};

/// Marker kind for tokens encoded into a signed string.
#[derive(Debug)]
pub enum Stateless {}

/// Per-type configuration and validity hook for stateless tokens.
///
/// Every setting returns `None` by default, deferring to
/// [`Settings`](crate::Settings) and then the built-in defaults.
pub trait HmacToken: Token {
    /// Salt for the signature. Leaving it at the default, or sharing one
    /// salt between token types, lets one type's keys redeem as another.
    fn salt() -> Option<&'static str> {
        None
    }

    /// Name of a registered serializer.
    fn serializer() -> Option<&'static str> {
        None
    }

    /// Try to zlib-compress the payload.
    fn compress() -> Option<bool> {
        None
    }

    /// Lifetime of a key.
    fn max_age() -> Option<Duration> {
        None
    }

    /// Runs on every successfully decoded token before it is returned.
    ///
    /// Return `Err(AlreadyUsed)` to reject it. The default accepts every
    /// token and warns that single use isn't enforced.
    fn check_validity(&self) -> std::result::Result<(), AlreadyUsed> {
        security::warn(SecurityWarning::NotSingleUse { token: Self::name() });
        Ok(())
    }
}

/// Effective configuration of an [`HmacToken`] type, resolved from the
/// type's overrides, the settings and the defaults.
#[derive(Clone)]
pub struct HmacConfig {
    pub salt: String,
    pub serializer_name: String,
    pub serializer: Arc<dyn Serializer>,
    pub compress: bool,
    pub max_age: Duration,
}

impl HmacConfig {
    /// Resolve the configuration for `T`.
    ///
    /// Logs a security warning when the salt resolves to the built-in
    /// default.
    pub fn resolve<T: HmacToken>(tokens: &Tokens) -> std::result::Result<Self, ConfigError> {
        let settings = tokens.settings();

        let salt = resolve(T::salt(), settings.hmac_token_salt()).to_string();
        if salt == defaults::HMAC_TOKEN_SALT {
            security::warn(SecurityWarning::DefaultSalt);
        }

        let serializer_name =
            resolve(T::serializer(), settings.hmac_token_serializer()).to_string();
        let serializer = tokens.serializer(&serializer_name)?;

        Ok(Self {
            salt,
            serializer_name,
            serializer,
            compress: resolve(T::compress(), settings.hmac_token_compress()),
            max_age: resolve(T::max_age(), settings.hmac_token_max_age()),
        })
    }

    fn signing(&self, tokens: &Tokens) -> std::result::Result<SigningConfig, ConfigError> {
        let key = tokens.settings().secret_key()?.clone();
        Ok(SigningConfig::new(key, self.salt.clone())
            .with_serializer(Arc::clone(&self.serializer))
            .with_compress(self.compress))
    }
}

impl<T: HmacToken> TokenKind<T> for Stateless {
    /// Encode the data. Not memoized; encoding the same data under the same
    /// configuration within the same second yields the same key.
    fn key(token: &T, tokens: &Tokens) -> Result<String> {
        let config = HmacConfig::resolve::<T>(tokens)?;
        let signing = config.signing(tokens)?;
        signing::dumps(&token.data().to_value(), &signing).map_err(TokenError::Encode)
    }

    fn from_key(tokens: &Tokens, key: &str) -> Result<T> {
        let config = HmacConfig::resolve::<T>(tokens)?;
        let signing = config.signing(tokens)?;

        let value = signing::loads(key, &signing, Some(config.max_age)).map_err(|e| {
            log::debug!("Rejected {} key ({:?}): {}", T::name(), e.failure(), e);
            TokenError::DoesNotExist
        })?;

        let data = TokenData::try_from(value).map_err(|_| {
            log::debug!("Rejected {} key: payload is not an object", T::name());
            TokenError::DoesNotExist
        })?;

        let token = T::rehydrate(data);
        token.check_validity().map_err(|AlreadyUsed| {
            log::debug!("Rejected {} key: already used", T::name());
            TokenError::DoesNotExist
        })?;

        Ok(token)
    }
}

/// A stateless token with every setting left to the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleHmacToken {
    data: TokenData,
}

impl SimpleHmacToken {
    pub fn new(data: TokenData) -> Self {
        Self { data }
    }
}

impl Token for SimpleHmacToken {
    type Kind = Stateless;

    fn data(&self) -> &TokenData {
        &self.data
    }

    fn rehydrate(data: TokenData) -> Self {
        Self { data }
    }
}

impl HmacToken for SimpleHmacToken {}
