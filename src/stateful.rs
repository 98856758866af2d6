//! Stateful tokens: data lives in an ephemeral store, the key is a handle.
//!
//! The first [`Token::key`] call generates a random key and stores the data
//! under it with the configured TTL. Redemption removes the entry, so a key
//! works at most once by construction. Unknown, expired and already
//! redeemed keys are indistinguishable.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;

use crate::config::resolve;
use crate::context::Tokens;
use crate::data::TokenData;
use crate::error::{ConfigError, Result, TokenError};
use crate::store::Store;
use crate::token::{Token, TokenKind};

/// Marker kind for tokens stored in an ephemeral store.
#[derive(Debug)]
pub enum Stateful {}

/// Per-type configuration for stateful tokens.
///
/// Every setting returns `None` by default, deferring to
/// [`Settings`](crate::Settings) and then the built-in defaults.
pub trait CacheToken: Token {
    /// The slot memoizing this instance's key.
    fn key_slot(&self) -> &KeySlot;

    /// Name of the registered store to keep data in. Point it at a backend
    /// whose durability fits the use case.
    fn cache_name() -> Option<&'static str> {
        None
    }

    /// Length of generated keys.
    fn key_length() -> Option<usize> {
        None
    }

    /// Lifetime of a stored entry.
    fn max_age() -> Option<Duration> {
        None
    }
}

/// Lazily generated lookup key of one token instance.
///
/// Stays empty until the first `key` call; afterwards always holds the same
/// key. Rehydrated tokens start with an empty slot.
#[derive(Debug, Default)]
pub struct KeySlot(Mutex<Option<String>>);

impl KeySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key, if one was generated.
    pub fn get(&self) -> Option<String> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return the memoized key or run `init` to produce and remember one.
    ///
    /// Holds the slot's lock across `init`, so concurrent callers on the
    /// same instance store only once.
    fn get_or_try_init(&self, init: impl FnOnce() -> Result<String>) -> Result<String> {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = slot.as_ref() {
            return Ok(key.clone());
        }
        let key = init()?;
        *slot = Some(key.clone());
        Ok(key)
    }
}

/// Effective configuration of a [`CacheToken`] type.
#[derive(Clone)]
pub struct CacheConfig {
    pub cache_name: String,
    pub store: Arc<dyn Store>,
    pub key_length: usize,
    pub max_age: Duration,
}

impl CacheConfig {
    /// Resolve the configuration for `T`.
    pub fn resolve<T: CacheToken>(tokens: &Tokens) -> std::result::Result<Self, ConfigError> {
        let settings = tokens.settings();
        let cache_name = resolve(T::cache_name(), settings.cache_token_cache_name()).to_string();
        let store = tokens.cache(&cache_name)?;

        Ok(Self {
            cache_name,
            store,
            key_length: resolve(T::key_length(), settings.cache_token_key_length()),
            max_age: resolve(T::max_age(), settings.cache_token_max_age()),
        })
    }
}

/// Random string of `length` characters from `[A-Za-z0-9]`.
pub fn random_key(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

impl<T: CacheToken> TokenKind<T> for Stateful {
    fn key(token: &T, tokens: &Tokens) -> Result<String> {
        token.key_slot().get_or_try_init(|| {
            let config = CacheConfig::resolve::<T>(tokens)?;
            let key = random_key(config.key_length);
            let value = token
                .data()
                .to_bytes()
                .map_err(|e| TokenError::Encode(signing::SigningError::serialization(e)))?;

            config
                .store
                .set(&key, value, config.max_age)
                .map_err(TokenError::Store)?;
            log::debug!(
                "Stored {} data in cache '{}' for {:?}",
                T::name(),
                config.cache_name,
                config.max_age
            );
            Ok(key)
        })
    }

    fn from_key(tokens: &Tokens, key: &str) -> Result<T> {
        let config = CacheConfig::resolve::<T>(tokens)?;

        let bytes = match config.store.take(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Err(TokenError::DoesNotExist),
            Err(e) => {
                log::debug!("Rejected {} key: store failed: {}", T::name(), e);
                return Err(TokenError::DoesNotExist);
            }
        };

        let data = TokenData::from_bytes(&bytes).map_err(|e| {
            log::debug!("Rejected {} key: undecodable entry: {}", T::name(), e);
            TokenError::DoesNotExist
        })?;

        Ok(T::rehydrate(data))
    }
}

/// A stateful token with every setting left to the configuration.
#[derive(Debug, Default)]
pub struct SimpleCacheToken {
    data: TokenData,
    key: KeySlot,
}

impl SimpleCacheToken {
    pub fn new(data: TokenData) -> Self {
        Self {
            data,
            key: KeySlot::new(),
        }
    }
}

impl Token for SimpleCacheToken {
    type Kind = Stateful;

    fn data(&self) -> &TokenData {
        &self.data
    }

    fn rehydrate(data: TokenData) -> Self {
        Self::new(data)
    }
}

impl CacheToken for SimpleCacheToken {
    fn key_slot(&self) -> &KeySlot {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::store::{MemoryStore, StoreError};
    use serde_json::json;

    struct TestCacheToken {
        data: TokenData,
        key: KeySlot,
    }

    impl TestCacheToken {
        fn new(data: TokenData) -> Self {
            Self {
                data,
                key: KeySlot::new(),
            }
        }
    }

    impl Token for TestCacheToken {
        type Kind = Stateful;

        fn data(&self) -> &TokenData {
            &self.data
        }

        fn rehydrate(data: TokenData) -> Self {
            Self::new(data)
        }
    }

    impl CacheToken for TestCacheToken {
        fn key_slot(&self) -> &KeySlot {
            &self.key
        }

        fn key_length() -> Option<usize> {
            Some(10)
        }
    }

    fn tokens() -> Tokens {
        Tokens::new(Settings::new("secret")).unwrap()
    }

    #[test]
    fn test_key_format() {
        let key = TestCacheToken::new(TokenData::new().with("year", 2019))
            .key(&tokens())
            .unwrap();
        assert_eq!(key.len(), 10);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_default_key_length() {
        let key = SimpleCacheToken::new(TokenData::new()).key(&tokens()).unwrap();
        assert_eq!(key.len(), 20);
    }

    #[test]
    fn test_key_is_memoized_and_stored_once() {
        let store = Arc::new(MemoryStore::new());
        let tokens = Tokens::builder(Settings::new("secret"))
            .cache("default", store.clone())
            .build()
            .unwrap();

        let token = TestCacheToken::new(TokenData::new().with("a", 1));
        assert!(token.key_slot().get().is_none());
        let first = token.key(&tokens).unwrap();
        let second = token.key(&tokens).unwrap();

        assert_eq!(first, second);
        assert_eq!(token.key_slot().get(), Some(first));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_roundtrip_consumes() {
        let tokens = tokens();
        let token = TestCacheToken::new(TokenData::new().with("user_id", 1294));
        let key = token.key(&tokens).unwrap();

        let redeemed = TestCacheToken::from_key(&tokens, &key).unwrap();
        assert_eq!(redeemed.get("user_id"), Some(&json!(1294)));
        assert!(redeemed.key_slot().get().is_none());

        let again = TestCacheToken::from_key(&tokens, &key);
        assert!(matches!(again, Err(TokenError::DoesNotExist)));
    }

    #[test]
    fn test_unknown_key() {
        let result = TestCacheToken::from_key(&tokens(), "invalid");
        assert!(matches!(result, Err(TokenError::DoesNotExist)));
    }

    #[test]
    fn test_zero_max_age_expires() {
        let tokens = tokens()
            .with_settings(&Settings {
                cache_token_max_age: Some(0),
                ..Settings::default()
            })
            .unwrap();
        let key = TestCacheToken::new(TokenData::new().with("email", "hej@mail.com"))
            .key(&tokens)
            .unwrap();

        let result = TestCacheToken::from_key(&tokens, &key);
        assert!(matches!(result, Err(TokenError::DoesNotExist)));
    }

    #[test]
    fn test_unknown_cache_is_config_error() {
        let tokens = tokens()
            .with_settings(&Settings {
                cache_token_cache_name: Some("missing".into()),
                ..Settings::default()
            })
            .unwrap();
        let result = TestCacheToken::new(TokenData::new()).key(&tokens);
        assert!(matches!(
            result,
            Err(TokenError::Config(ConfigError::UnknownCache(_)))
        ));
    }

    struct BrokenStore;

    impl Store for BrokenStore {
        fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }

        fn set(
            &self,
            _key: &str,
            _value: Vec<u8>,
            _ttl: Duration,
        ) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }

        fn delete(&self, _key: &str) -> std::result::Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[test]
    fn test_store_failures() {
        let tokens = Tokens::builder(Settings::new("secret"))
            .cache("default", Arc::new(BrokenStore))
            .build()
            .unwrap();

        let token = TestCacheToken::new(TokenData::new());
        assert!(matches!(token.key(&tokens), Err(TokenError::Store(_))));
        // A failed store leaves the slot empty
        assert!(token.key_slot().get().is_none());

        let result = TestCacheToken::from_key(&tokens, "anything");
        assert!(matches!(result, Err(TokenError::DoesNotExist)));
    }

    #[test]
    fn test_corrupt_entry_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("corrupt", b"[1,2]".to_vec(), Duration::from_secs(60))
            .unwrap();
        let tokens = Tokens::builder(Settings::new("secret"))
            .cache("default", store)
            .build()
            .unwrap();

        let result = TestCacheToken::from_key(&tokens, "corrupt");
        assert!(matches!(result, Err(TokenError::DoesNotExist)));
    }

    #[test]
    fn test_unredeemed_expired_keys_do_not_accumulate() {
        let store = Arc::new(MemoryStore::new());
        let tokens = Tokens::builder(Settings {
            cache_token_max_age: Some(0),
            ..Settings::new("secret")
        })
        .cache("default", store.clone())
        .build()
        .unwrap();

        for _ in 0..10_000 {
            SimpleCacheToken::new(TokenData::new().with("a", 1))
                .key(&tokens)
                .unwrap();
        }
        assert!(store.len() <= 1024, "len = {}", store.len());
    }

    #[test]
    fn test_random_key_charset() {
        let key = random_key(500);
        assert_eq!(key.len(), 500);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(random_key(20), random_key(20));
    }
}
