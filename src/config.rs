//! Settings and the override resolver.
//!
//! Every effective value is resolved in three tiers: a per-token-type
//! override, then the application [`Settings`], then the built-in default.
//! Nothing is cached; callers resolve on each use so scoped overrides take
//! effect immediately.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use signing::SecretKey;

use crate::error::ConfigError;

/// Built-in defaults.
pub mod defaults {
    use std::time::Duration;

    pub const HMAC_TOKEN_SERIALIZER: &str = "json";
    pub const HMAC_TOKEN_COMPRESS: bool = false;
    /// Placeholder salt. Using it logs a security warning.
    pub const HMAC_TOKEN_SALT: &str = "tokens.salt";
    pub const HMAC_TOKEN_MAX_AGE: Duration = Duration::from_secs(300);

    pub const CACHE_TOKEN_CACHE_NAME: &str = "default";
    pub const CACHE_TOKEN_KEY_LENGTH: usize = 20;
    pub const CACHE_TOKEN_MAX_AGE: Duration = Duration::from_secs(300);
}

/// Application-level settings. Unset fields fall back to [`defaults`].
///
/// Loaded from YAML, for example:
///
/// ```yaml
/// secret_key: "change-me"
/// hmac_token_salt: "password-reset"
/// hmac_token_max_age: 120
/// cache_token_key_length: 32
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub secret_key: Option<SecretKey>,
    pub hmac_token_serializer: Option<String>,
    pub hmac_token_compress: Option<bool>,
    pub hmac_token_salt: Option<String>,
    /// Seconds.
    pub hmac_token_max_age: Option<u64>,
    pub cache_token_cache_name: Option<String>,
    pub cache_token_key_length: Option<usize>,
    /// Seconds.
    pub cache_token_max_age: Option<u64>,
}

impl Settings {
    /// Settings with only a secret key.
    pub fn new(secret_key: impl Into<SecretKey>) -> Self {
        Self {
            secret_key: Some(secret_key.into()),
            ..Self::default()
        }
    }

    /// Parse settings from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML settings file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Layer `overrides` on top of these settings: every field set there
    /// wins, everything else is kept.
    pub fn overridden_by(&self, overrides: &Settings) -> Settings {
        let o = overrides.clone();
        let s = self.clone();
        Settings {
            secret_key: o.secret_key.or(s.secret_key),
            hmac_token_serializer: o.hmac_token_serializer.or(s.hmac_token_serializer),
            hmac_token_compress: o.hmac_token_compress.or(s.hmac_token_compress),
            hmac_token_salt: o.hmac_token_salt.or(s.hmac_token_salt),
            hmac_token_max_age: o.hmac_token_max_age.or(s.hmac_token_max_age),
            cache_token_cache_name: o.cache_token_cache_name.or(s.cache_token_cache_name),
            cache_token_key_length: o.cache_token_key_length.or(s.cache_token_key_length),
            cache_token_max_age: o.cache_token_max_age.or(s.cache_token_max_age),
        }
    }

    /// The secret key, if configured and non-empty.
    pub fn secret_key(&self) -> Result<&SecretKey, ConfigError> {
        self.secret_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingSecretKey)
    }

    pub fn hmac_token_serializer(&self) -> &str {
        self.hmac_token_serializer
            .as_deref()
            .unwrap_or(defaults::HMAC_TOKEN_SERIALIZER)
    }

    pub fn hmac_token_compress(&self) -> bool {
        self.hmac_token_compress
            .unwrap_or(defaults::HMAC_TOKEN_COMPRESS)
    }

    pub fn hmac_token_salt(&self) -> &str {
        self.hmac_token_salt
            .as_deref()
            .unwrap_or(defaults::HMAC_TOKEN_SALT)
    }

    pub fn hmac_token_max_age(&self) -> Duration {
        self.hmac_token_max_age
            .map(Duration::from_secs)
            .unwrap_or(defaults::HMAC_TOKEN_MAX_AGE)
    }

    pub fn cache_token_cache_name(&self) -> &str {
        self.cache_token_cache_name
            .as_deref()
            .unwrap_or(defaults::CACHE_TOKEN_CACHE_NAME)
    }

    pub fn cache_token_key_length(&self) -> usize {
        self.cache_token_key_length
            .unwrap_or(defaults::CACHE_TOKEN_KEY_LENGTH)
    }

    pub fn cache_token_max_age(&self) -> Duration {
        self.cache_token_max_age
            .map(Duration::from_secs)
            .unwrap_or(defaults::CACHE_TOKEN_MAX_AGE)
    }
}

/// Pick the per-type override if set, otherwise the global value.
pub fn resolve<T>(class_override: Option<T>, global: T) -> T {
    class_override.unwrap_or(global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.hmac_token_serializer(), "json");
        assert!(!settings.hmac_token_compress());
        assert_eq!(settings.hmac_token_salt(), "tokens.salt");
        assert_eq!(settings.hmac_token_max_age(), Duration::from_secs(300));
        assert_eq!(settings.cache_token_cache_name(), "default");
        assert_eq!(settings.cache_token_key_length(), 20);
        assert_eq!(settings.cache_token_max_age(), Duration::from_secs(300));
    }

    #[test]
    fn test_user_settings_beat_defaults() {
        let settings = Settings {
            hmac_token_max_age: Some(120),
            cache_token_key_length: Some(10),
            ..Settings::default()
        };
        assert_eq!(settings.hmac_token_max_age(), Duration::from_secs(120));
        assert_eq!(settings.cache_token_key_length(), 10);
    }

    #[test]
    fn test_resolve_prefers_class_override() {
        assert_eq!(resolve(Some("class"), "global"), "class");
        assert_eq!(resolve(None, "global"), "global");
    }

    #[test]
    fn test_missing_secret_key() {
        let settings = Settings::default();
        assert!(matches!(
            settings.secret_key(),
            Err(ConfigError::MissingSecretKey)
        ));
        let settings = Settings::new("");
        assert!(matches!(
            settings.secret_key(),
            Err(ConfigError::MissingSecretKey)
        ));
        assert!(Settings::new("k").secret_key().is_ok());
    }

    #[test]
    fn test_overridden_by() {
        let base = Settings {
            hmac_token_salt: Some("base".into()),
            hmac_token_max_age: Some(60),
            ..Settings::new("secret")
        };
        let overrides = Settings {
            hmac_token_max_age: Some(0),
            ..Settings::default()
        };

        let merged = base.overridden_by(&overrides);
        assert_eq!(merged.hmac_token_salt(), "base");
        assert_eq!(merged.hmac_token_max_age(), Duration::ZERO);
        assert!(merged.secret_key().is_ok());
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
secret_key: "s3cr3t"
hmac_token_salt: "password-reset"
hmac_token_compress: true
cache_token_max_age: 60
"#;
        let settings = Settings::from_yaml_str(yaml).expect("Failed to parse settings");
        assert_eq!(settings.secret_key().unwrap(), &SecretKey::from("s3cr3t"));
        assert_eq!(settings.hmac_token_salt(), "password-reset");
        assert!(settings.hmac_token_compress());
        assert_eq!(settings.cache_token_max_age(), Duration::from_secs(60));
        assert_eq!(settings.cache_token_key_length(), 20);
    }

    #[test]
    fn test_from_yaml_rejects_unknown_settings() {
        let result = Settings::from_yaml_str("hmac_token_sault: typo\n");
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "secret_key: from-file").unwrap();
        writeln!(file, "cache_token_cache_name: sessions").unwrap();

        let settings = Settings::from_yaml_file(file.path()).unwrap();
        assert_eq!(settings.cache_token_cache_name(), "sessions");
    }

    #[test]
    fn test_from_missing_file() {
        let result = Settings::from_yaml_file("/nonexistent/tokens.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
