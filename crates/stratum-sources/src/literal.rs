//! Fixed-value source.

use stratum_core::{KeyValueSource, SourceError};

/// A [`KeyValueSource`] that answers every key with the same value.
///
/// Placed at the tail of a chain, it guarantees that every placeholder
/// resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralDefault {
    value: String,
}

impl LiteralDefault {
    /// Creates a source that always returns `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns the fixed value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl KeyValueSource for LiteralDefault {
    fn name(&self) -> &str {
        "literal-default"
    }

    fn get(&self, _key: &str) -> Result<Option<String>, SourceError> {
        Ok(Some(self.value.clone()))
    }
}
