//! In-memory property sets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::source::{KeyValueSource, SourceError};

/// A named collection of configuration properties.
///
/// A `PropertySource` holds the materialized contents of one namespace,
/// file or test fixture. It is itself a [`KeyValueSource`], so it can be
/// placed directly into a [`crate::SourceChain`].
///
/// # Example
///
/// ```
/// use stratum_core::PropertySource;
/// use std::collections::HashMap;
///
/// let mut props = HashMap::new();
/// props.insert("server.port".to_string(), "8080".to_string());
///
/// let source = PropertySource::new("application", props);
/// assert_eq!(source.get("server.port"), Some("8080"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySource {
    /// Name of the source (namespace, filename or fixture label)
    name: String,
    /// Key-value properties from this source
    properties: HashMap<String, String>,
}

impl PropertySource {
    /// Creates a new `PropertySource` with the given name and properties.
    pub fn new(name: impl Into<String>, properties: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Creates an empty `PropertySource`.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, HashMap::new())
    }

    /// Adds a property, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns the name of this property source.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a reference to the properties map.
    #[must_use]
    pub const fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    /// Gets a property value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Inserts a property, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.properties.insert(key.into(), value.into())
    }

    /// Removes a property, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    /// Returns all keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.properties.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl KeyValueSource for PropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.properties.get(key).cloned())
    }
}
