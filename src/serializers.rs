//! Named serializer registry.
//!
//! The serializer setting is a name; this registry turns it into a live
//! [`Serializer`]. `"json"` is always available.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use signing::{JsonSerializer, Serializer};

use crate::error::ConfigError;

/// Maps serializer names to implementations.
#[derive(Clone)]
pub struct Serializers {
    by_name: HashMap<String, Arc<dyn Serializer>>,
}

impl Default for Serializers {
    fn default() -> Self {
        let mut serializers = Self {
            by_name: HashMap::new(),
        };
        serializers.register("json", Arc::new(JsonSerializer));
        serializers
    }
}

impl Serializers {
    /// A registry holding only `"json"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a serializer.
    pub fn register(&mut self, name: impl Into<String>, serializer: Arc<dyn Serializer>) {
        self.by_name.insert(name.into(), serializer);
    }

    /// Look up a serializer by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Serializer>, ConfigError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownSerializer(name.to_string()))
    }
}

impl fmt::Debug for Serializers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("Serializers").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_is_registered() {
        let serializers = Serializers::new();
        let json = serializers.resolve("json").unwrap();
        assert_eq!(json.dumps(&json!({"a": 1})).unwrap(), br#"{"a":1}"#);
    }

    #[test]
    fn test_unknown_name() {
        let result = Serializers::new().resolve("pickle");
        assert!(matches!(result, Err(ConfigError::UnknownSerializer(name)) if name == "pickle"));
    }

    #[test]
    fn test_register_alias() {
        let mut serializers = Serializers::new();
        serializers.register("compact-json", Arc::new(JsonSerializer));
        assert!(serializers.resolve("compact-json").is_ok());
    }
}
