//! The capability shared by every token kind.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::Tokens;
use crate::data::TokenData;
use crate::error::{FieldError, Result};

/// A bundle of data with an external representation that can regenerate it.
///
/// Implementors own a [`TokenData`] and pick a [`TokenKind`]:
/// [`Stateless`](crate::Stateless) (also implement
/// [`HmacToken`](crate::HmacToken)) or [`Stateful`](crate::Stateful) (also
/// implement [`CacheToken`](crate::CacheToken)).
///
/// Public constructors are up to the implementor and may take any
/// arguments. Redemption never calls them; it goes through
/// [`Token::rehydrate`] with the decoded data.
pub trait Token: Sized {
    type Kind: TokenKind<Self>;

    /// The data this token carries.
    fn data(&self) -> &TokenData;

    /// Build a token directly from redeemed data.
    fn rehydrate(data: TokenData) -> Self;

    /// Type name used in warnings and errors: the last path segment of the
    /// type, without generic arguments. Override for a custom label.
    fn name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let path = full.split('<').next().unwrap_or(full);
        path.rsplit("::").next().unwrap_or(path)
    }

    /// Look up a data field.
    fn get(&self, field: &str) -> Option<&Value> {
        self.data().get(field)
    }

    /// Look up a data field and deserialize it.
    fn field<T: DeserializeOwned>(&self, field: &str) -> std::result::Result<T, FieldError> {
        let value = self.get(field).ok_or_else(|| FieldError::Missing {
            token: Self::name(),
            field: field.to_string(),
        })?;
        T::deserialize(value).map_err(|source| FieldError::Invalid {
            token: Self::name(),
            field: field.to_string(),
            source,
        })
    }

    /// The external representation to hand to the untrusted party.
    fn key(&self, tokens: &Tokens) -> Result<String> {
        Self::Kind::key(self, tokens)
    }

    /// Redeem an external representation.
    ///
    /// Every kind of invalid input fails with
    /// [`TokenError::DoesNotExist`](crate::TokenError::DoesNotExist); only
    /// configuration errors are reported separately.
    fn from_key(tokens: &Tokens, key: &str) -> Result<Self> {
        Self::Kind::from_key(tokens, key)
    }
}

/// How a token kind issues and redeems keys.
pub trait TokenKind<T> {
    fn key(token: &T, tokens: &Tokens) -> Result<String>;

    fn from_key(tokens: &Tokens, key: &str) -> Result<T>;
}
