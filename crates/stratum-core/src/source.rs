//! Key/value lookup capability and ordered source chains.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

/// Failure of a single lookup against a [`KeyValueSource`].
///
/// The resolver treats any of these exactly like an absent value and moves
/// on to the next source in the chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The backing store could not be reached.
    #[error("source '{source_name}' unavailable: {reason}")]
    Unavailable {
        /// Name of the failing source.
        source_name: String,
        /// Failure description.
        reason: String,
    },

    /// A value exists but cannot be represented as a string.
    #[error("invalid value for '{key}' in source '{source_name}': {reason}")]
    InvalidValue {
        /// Name of the failing source.
        source_name: String,
        /// Key that was looked up.
        key: String,
        /// Failure description.
        reason: String,
    },
}

impl SourceError {
    /// Creates a [`SourceError::Unavailable`] error.
    pub fn unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`SourceError::InvalidValue`] error.
    pub fn invalid_value(
        source_name: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            source_name: source_name.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// A read-only key/value lookup.
///
/// Implementations may block (a source backed by a remote namespace, for
/// example); timeouts are the implementation's concern.
pub trait KeyValueSource: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Looks up a key.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the lookup itself failed, as opposed
    /// to the key being absent (`Ok(None)`).
    fn get(&self, key: &str) -> Result<Option<String>, SourceError>;
}

impl<T: KeyValueSource + ?Sized> KeyValueSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<String>, SourceError> {
        (**self).get(key)
    }
}

/// Identity of a constructed [`SourceChain`].
///
/// Two chains built separately never share an id, even with the same
/// sources. Clones of a chain share the id of the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(Uuid);

impl ChainId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, immutable sequence of sources. The first source that has a
/// value for a key wins.
///
/// # Example
///
/// ```
/// use stratum_core::{PropertySource, SourceChain};
///
/// let chain = SourceChain::builder()
///     .source(PropertySource::empty("overrides").with("k", "x"))
///     .source(PropertySource::empty("defaults").with("k", "y"))
///     .build();
///
/// assert_eq!(chain.len(), 2);
/// assert_eq!(chain.names(), vec!["overrides", "defaults"]);
/// ```
#[derive(Clone)]
pub struct SourceChain {
    id: ChainId,
    sources: Arc<[Arc<dyn KeyValueSource>]>,
}

impl SourceChain {
    /// Returns a builder for constructing a chain.
    #[must_use]
    pub fn builder() -> SourceChainBuilder {
        SourceChainBuilder::default()
    }

    /// Creates a chain with no sources.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_sources(Vec::new())
    }

    /// Creates a chain from already shared sources, in order.
    #[must_use]
    pub fn from_sources(sources: Vec<Arc<dyn KeyValueSource>>) -> Self {
        Self {
            id: ChainId::generate(),
            sources: sources.into(),
        }
    }

    /// Returns the identity of this chain.
    #[must_use]
    pub const fn id(&self) -> ChainId {
        self.id
    }

    /// Iterates over the sources in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn KeyValueSource> {
        self.sources.iter().map(|source| source.as_ref())
    }

    /// Returns the source names in precedence order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|source| source.name()).collect()
    }

    /// Returns the number of sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if the chain has no sources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceChain {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for SourceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceChain")
            .field("id", &self.id)
            .field("sources", &self.names())
            .finish()
    }
}

/// Builder for [`SourceChain`].
#[derive(Default)]
pub struct SourceChainBuilder {
    sources: Vec<Arc<dyn KeyValueSource>>,
}

impl SourceChainBuilder {
    /// Appends an owned source (lower precedence than those already added).
    #[must_use]
    pub fn source(mut self, source: impl KeyValueSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Appends a shared source (lower precedence than those already added).
    #[must_use]
    pub fn shared(mut self, source: Arc<dyn KeyValueSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Builds the chain, assigning it a fresh identity.
    #[must_use]
    pub fn build(self) -> SourceChain {
        SourceChain::from_sources(self.sources)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::PropertySource;

    struct Failing;

    impl KeyValueSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn get(&self, _key: &str) -> Result<Option<String>, SourceError> {
            Err(SourceError::unavailable("failing", "network down"))
        }
    }

    #[test]
    fn test_chain_preserves_order() {
        let chain = SourceChain::builder()
            .source(PropertySource::empty("first"))
            .source(Failing)
            .source(PropertySource::empty("last"))
            .build();

        assert_eq!(chain.names(), vec!["first", "failing", "last"]);
    }

    #[test]
    fn test_clone_shares_identity() {
        let chain = SourceChain::builder()
            .source(PropertySource::empty("a"))
            .build();
        let clone = chain.clone();

        assert_eq!(chain.id(), clone.id());
    }

    #[test]
    fn test_separate_chains_have_distinct_identity() {
        let a = SourceChain::empty();
        let b = SourceChain::empty();

        assert_ne!(a.id(), b.id());
        assert!(a.is_empty());
    }

    #[test]
    fn test_shared_source() {
        let shared: Arc<dyn KeyValueSource> = Arc::new(PropertySource::empty("s").with("k", "v"));
        let chain = SourceChain::builder().shared(Arc::clone(&shared)).build();

        let first = chain.iter().next().unwrap();
        assert_eq!(first.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_source_error_display() {
        let err = Failing.get("any").unwrap_err();
        assert_eq!(err.to_string(), "source 'failing' unavailable: network down");
    }

    #[test]
    fn test_debug_lists_sources() {
        let chain = SourceChain::builder()
            .source(PropertySource::empty("defaults"))
            .build();
        let debug = format!("{chain:?}");
        assert!(debug.contains("defaults"));
    }
}
