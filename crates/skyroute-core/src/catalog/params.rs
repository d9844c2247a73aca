//! Caller-supplied parameter maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvalidInputError;

/// Parameter values keyed by declared parameter name.
///
/// Values are plain JSON so hosts can pass through whatever their own
/// configuration layer produced. `null` and `""` count as absent.
///
/// # Example
///
/// ```
/// use skyroute_core::Params;
///
/// let params = Params::new().with("feed", "at://x").with("limit", 10).with("cursor", "");
/// assert!(params.get("feed").is_some());
/// assert!(params.get("cursor").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the value for `name` unless it is missing, `null` or `""`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a `name=value` pair as typed on a command line.
    ///
    /// The value is kept as a string; numeric parameters accept numeric
    /// strings during rendering.
    pub fn parse_pair(pair: &str) -> Result<(String, Value), InvalidInputError> {
        let (name, value) = pair.split_once('=').ok_or_else(|| InvalidInputError::Param {
            value: pair.to_string(),
            reason: "expected name=value".to_string(),
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidInputError::Param {
                value: pair.to_string(),
                reason: "parameter name is empty".to_string(),
            });
        }

        Ok((name.to_string(), Value::String(value.to_string())))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
