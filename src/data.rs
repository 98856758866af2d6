//! Field storage carried by every token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered mapping from field name to JSON value.
///
/// Built once by the code that creates a token, then only read. The
/// insertion order is kept so stateless keys stay stable for the same
/// construction sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenData(Map<String, Value>);

impl TokenData {
    /// Create empty token data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any earlier field with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The data as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Serialize for an ephemeral store.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.0)
    }

    /// Parse bytes written by [`TokenData::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes).map(Self)
    }
}

/// Only JSON objects are token data; anything else is handed back.
impl TryFrom<Value> for TokenData {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl From<TokenData> for Value {
    fn from(data: TokenData) -> Self {
        Value::Object(data.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for TokenData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
