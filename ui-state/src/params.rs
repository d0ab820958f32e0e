//! Persistent parameter lookup
//!
//! Parameter storage lives outside this library. The UI only needs to read
//! a handful of keys, and a missing or malformed key is never fatal: callers
//! substitute a default at the call site.

use std::collections::HashMap;

/// Result type for parameter reads
pub type Result<T> = std::result::Result<T, ParamsError>;

/// Errors returned by a parameter store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamsError {
    #[error("Unknown param key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for param {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Read access to a parameter store
pub trait Params {
    /// Raw string value of a key
    fn get(&self, key: &str) -> Result<String>;

    /// Boolean value of a key (`"1"` is true, anything else false)
    fn get_bool(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.trim() == "1")
    }

    /// Integer value of a key
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get(key)?;
        value
            .trim()
            .parse()
            .map_err(|_| ParamsError::InvalidValue {
                key: key.to_string(),
                value,
            })
    }
}

/// In-memory parameter store
#[derive(Debug, Clone, Default)]
pub struct MemoryParams {
    values: HashMap<String, String>,
}

impl MemoryParams {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Set a boolean value
    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) {
        self.put(key, if value { "1" } else { "0" });
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Params for MemoryParams {
    fn get(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ParamsError::UnknownKey(key.to_string()))
    }
}
