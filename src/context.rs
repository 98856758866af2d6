//! The explicit configuration context tokens are issued and redeemed with.

use std::sync::Arc;

use signing::Serializer;

use crate::config::Settings;
use crate::error::ConfigError;
use crate::serializers::Serializers;
use crate::store::{Caches, Store};

/// Settings plus the serializer and store registries.
///
/// Cheap to clone. Values are resolved from it on every token operation, so
/// a context derived with [`Tokens::with_settings`] takes effect at once.
#[derive(Debug, Clone)]
pub struct Tokens {
    settings: Arc<Settings>,
    serializers: Arc<Serializers>,
    caches: Arc<Caches>,
}

impl Tokens {
    /// A context with the default registries: the `"json"` serializer and
    /// an in-memory `"default"` cache.
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        Self::builder(settings).build()
    }

    pub fn builder(settings: Settings) -> TokensBuilder {
        TokensBuilder {
            settings,
            serializers: Serializers::new(),
            caches: Caches::new(),
        }
    }

    /// A context with `overrides` layered over the current settings,
    /// sharing the same registries.
    ///
    /// Validated like a fresh context.
    pub fn with_settings(&self, overrides: &Settings) -> Result<Self, ConfigError> {
        let tokens = Self {
            settings: Arc::new(self.settings.overridden_by(overrides)),
            serializers: Arc::clone(&self.serializers),
            caches: Arc::clone(&self.caches),
        };
        tokens.validate()?;
        Ok(tokens)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve a serializer by name.
    pub fn serializer(&self, name: &str) -> Result<Arc<dyn Serializer>, ConfigError> {
        self.serializers.resolve(name)
    }

    /// Resolve a store by cache name.
    pub fn cache(&self, name: &str) -> Result<Arc<dyn Store>, ConfigError> {
        self.caches.get(name)
    }

    /// Fail fast on settings that could never work.
    fn validate(&self) -> Result<(), ConfigError> {
        self.settings.secret_key()?;
        self.serializer(self.settings.hmac_token_serializer())?;
        Ok(())
    }
}

/// Builder for [`Tokens`] with custom registries.
pub struct TokensBuilder {
    settings: Settings,
    serializers: Serializers,
    caches: Caches,
}

impl TokensBuilder {
    /// Register a serializer under `name`.
    pub fn serializer(mut self, name: impl Into<String>, serializer: Arc<dyn Serializer>) -> Self {
        self.serializers.register(name, serializer);
        self
    }

    /// Register a store under `name`, replacing the in-memory default when
    /// `name` is `"default"`.
    pub fn cache(mut self, name: impl Into<String>, store: Arc<dyn Store>) -> Self {
        self.caches.register(name, store);
        self
    }

    pub fn build(self) -> Result<Tokens, ConfigError> {
        let tokens = Tokens {
            settings: Arc::new(self.settings),
            serializers: Arc::new(self.serializers),
            caches: Arc::new(self.caches),
        };
        tokens.validate()?;
        log::info!(
            "Token context ready: serializer '{}', cache '{}'",
            tokens.settings.hmac_token_serializer(),
            tokens.settings.cache_token_cache_name()
        );
        Ok(tokens)
    }
}
