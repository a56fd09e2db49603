//! First-source-wins lookup of a single key.

use stratum_core::SourceChain;

/// Outcome of resolving one key against a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    /// A source had the key.
    Found {
        /// The value as stored in the source.
        value: String,
        /// Name of the source that answered.
        source: String,
    },
    /// No source had the key; the placeholder's default applies.
    Default(String),
    /// No source had the key and there is no default.
    Unresolved,
}

impl ResolvedValue {
    /// Returns the replacement text, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Found { value, .. } | Self::Default(value) => Some(value),
            Self::Unresolved => None,
        }
    }

    /// Consumes the outcome, returning the replacement text, if any.
    #[must_use]
    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Found { value, .. } | Self::Default(value) => Some(value),
            Self::Unresolved => None,
        }
    }
}

/// Resolves `key` against `chain`.
///
/// Sources are queried in order and querying stops at the first value. A
/// source that fails is logged and skipped, exactly as if it had no value.
///
/// # Examples
///
/// ```
/// use stratum_core::{PropertySource, SourceChain};
/// use stratum_resolver::precedence::{ResolvedValue, resolve_key};
///
/// let chain = SourceChain::builder()
///     .source(PropertySource::empty("app").with("port", "9090"))
///     .build();
///
/// assert_eq!(resolve_key("port", Some("8080"), &chain).value(), Some("9090"));
/// assert_eq!(resolve_key("host", Some("localhost"), &chain).value(), Some("localhost"));
/// assert_eq!(resolve_key("host", None, &chain), ResolvedValue::Unresolved);
/// ```
#[must_use]
pub fn resolve_key(key: &str, default_value: Option<&str>, chain: &SourceChain) -> ResolvedValue {
    for source in chain.iter() {
        match source.get(key) {
            Ok(Some(value)) => {
                tracing::trace!(key, source = source.name(), "Resolved key");
                return ResolvedValue::Found {
                    value,
                    source: source.name().to_string(),
                };
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(
                    key,
                    source = source.name(),
                    %error,
                    "Source lookup failed, trying next source"
                );
            }
        }
    }

    match default_value {
        Some(default) => ResolvedValue::Default(default.to_string()),
        None => ResolvedValue::Unresolved,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use stratum_core::{KeyValueSource, PropertySource, SourceError};

    struct Counting {
        inner: PropertySource,
        calls: Arc<AtomicUsize>,
    }

    impl KeyValueSource for Counting {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn get(&self, key: &str) -> Result<Option<String>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            KeyValueSource::get(&self.inner, key)
        }
    }

    struct Broken;

    impl KeyValueSource for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn get(&self, _key: &str) -> Result<Option<String>, SourceError> {
            Err(SourceError::unavailable("broken", "connection refused"))
        }
    }

    fn source(name: &str, key: &str, value: &str) -> PropertySource {
        PropertySource::empty(name).with(key, value)
    }

    #[test]
    fn test_first_source_wins() {
        let chain = SourceChain::builder()
            .source(source("source1", "k", "x"))
            .source(source("source2", "k", "y"))
            .build();

        assert_eq!(
            resolve_key("k", None, &chain),
            ResolvedValue::Found {
                value: "x".to_string(),
                source: "source1".to_string()
            }
        );
    }

    #[test]
    fn test_reversed_order_flips_winner() {
        let chain = SourceChain::builder()
            .source(source("source2", "k", "y"))
            .source(source("source1", "k", "x"))
            .build();

        assert_eq!(resolve_key("k", None, &chain).value(), Some("y"));
    }

    #[test]
    fn test_later_sources_not_queried_after_hit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = SourceChain::builder()
            .source(source("first", "k", "x"))
            .source(Counting {
                inner: source("second", "k", "y"),
                calls: Arc::clone(&calls),
            })
            .build();

        let _ = resolve_key("k", None, &chain);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_source_value_beats_default() {
        let chain = SourceChain::builder().source(source("s", "k", "x")).build();
        assert_eq!(resolve_key("k", Some("d"), &chain).value(), Some("x"));
    }

    #[test]
    fn test_default_when_absent_everywhere() {
        let chain = SourceChain::builder().source(source("s", "other", "x")).build();
        assert_eq!(
            resolve_key("missing", Some("default"), &chain),
            ResolvedValue::Default("default".to_string())
        );
    }

    #[test]
    fn test_empty_string_value_counts_as_present() {
        let chain = SourceChain::builder().source(source("s", "k", "")).build();
        assert_eq!(resolve_key("k", Some("d"), &chain).value(), Some(""));
    }

    #[test]
    fn test_failing_source_is_skipped() {
        let chain = SourceChain::builder()
            .source(Broken)
            .source(source("backup", "k", "from-backup"))
            .build();

        assert_eq!(
            resolve_key("k", None, &chain).into_value().as_deref(),
            Some("from-backup")
        );
    }

    #[test]
    fn test_failing_only_source_falls_back_to_default() {
        let chain = SourceChain::builder().source(Broken).build();

        assert_eq!(resolve_key("k", Some("d"), &chain).value(), Some("d"));
        assert_eq!(resolve_key("k", None, &chain), ResolvedValue::Unresolved);
    }

    #[test]
    fn test_empty_chain() {
        let chain = SourceChain::empty();
        assert_eq!(resolve_key("k", None, &chain), ResolvedValue::Unresolved);
    }
}
