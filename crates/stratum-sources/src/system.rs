//! Process-wide system properties.
//!
//! A small registry of `key=value` overrides set at startup (for example
//! from `-D key=value` command line flags) and read through
//! [`SystemProperty`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use stratum_core::{KeyValueSource, SourceError};

static GLOBAL: LazyLock<SystemProperties> = LazyLock::new(SystemProperties::new);

/// A shared, thread-safe property registry.
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct SystemProperties {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl SystemProperties {
    /// Creates an empty, independent registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the process-wide registry.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Sets a property, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.inner.write().insert(key.into(), value.into())
    }

    /// Removes a property, returning its value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.inner.write().remove(key)
    }

    /// Gets a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.read().get(key).cloned()
    }

    /// Parses `key=value` and sets it.
    ///
    /// Returns false (and sets nothing) if there is no `=` or the key is empty.
    pub fn set_from_assignment(&self, assignment: &str) -> bool {
        match assignment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                self.set(key.trim(), value);
                true
            }
            _ => false,
        }
    }
}

/// A [`KeyValueSource`] reading a [`SystemProperties`] registry.
#[derive(Debug, Clone)]
pub struct SystemProperty {
    properties: SystemProperties,
}

impl SystemProperty {
    /// Reads the process-wide registry.
    #[must_use]
    pub fn new() -> Self {
        Self::from_registry(SystemProperties::global())
    }

    /// Reads a specific registry.
    #[must_use]
    pub const fn from_registry(properties: SystemProperties) -> Self {
        Self { properties }
    }
}

impl Default for SystemProperty {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueSource for SystemProperty {
    fn name(&self) -> &str {
        "system-properties"
    }

    fn get(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.properties.get(key))
    }
}
