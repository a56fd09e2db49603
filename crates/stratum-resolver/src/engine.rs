//! Placeholder resolution engine
//!
//! Resolves `${key[:default]}` references against a [`SourceChain`],
//! expanding replacement values recursively and stopping at cycles.

use std::collections::HashSet;

use stratum_core::SourceChain;

use crate::cache::{CacheStats, ResolutionCache};
use crate::cycle::{Resolution, ResolutionContext, circular_marker};
use crate::parser::{PlaceholderToken, Segment, has_placeholders, parse, placeholders};
use crate::precedence::{ResolvedValue, resolve_key};
use crate::settings::EngineSettings;

/// The placeholder resolution engine.
///
/// One engine can be shared by any number of threads. Its only mutable
/// state is the [`ResolutionCache`]; everything about a single call lives in
/// a [`ResolutionContext`] created by that call.
///
/// # Example
///
/// ```
/// use stratum_core::{PropertySource, SourceChain};
/// use stratum_resolver::PlaceholderEngine;
///
/// let chain = SourceChain::builder()
///     .source(PropertySource::empty("application").with("host", "config.local"))
///     .build();
///
/// let engine = PlaceholderEngine::new();
/// assert_eq!(
///     engine.resolve("http://${host:localhost}:${port:8080}/api", &chain),
///     "http://config.local:8080/api"
/// );
/// ```
#[derive(Debug, Default)]
pub struct PlaceholderEngine {
    settings: EngineSettings,
    cache: ResolutionCache,
}

impl PlaceholderEngine {
    /// Creates an engine with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given settings.
    #[must_use]
    pub fn with_settings(settings: EngineSettings) -> Self {
        let cache = ResolutionCache::with_max_entries(settings.cache.max_entries);
        Self { settings, cache }
    }

    /// Returns the engine settings.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Resolves every placeholder in `template`.
    ///
    /// Never fails: unresolvable placeholders are kept verbatim and cycles
    /// collapse to the token's default or a `[CIRCULAR:<key>]` marker.
    #[must_use]
    pub fn resolve(&self, template: &str, chain: &SourceChain) -> String {
        self.resolve_detailed(template, chain).value
    }

    /// Resolves `template` and reports what happened along the way.
    #[must_use]
    pub fn resolve_detailed(&self, template: &str, chain: &SourceChain) -> Resolution {
        let mut ctx = ResolutionContext::new();
        let value = self.expand(template, chain, &mut ctx);
        ctx.finish(value)
    }

    /// Resolves `template`, reusing a stored result for the same template
    /// and chain.
    ///
    /// A hit neither parses the template nor queries any source. Stored
    /// results stay until [`evict`](Self::evict) or [`clear`](Self::clear).
    #[must_use]
    pub fn resolve_with_cache(&self, template: &str, chain: &SourceChain) -> String {
        if !self.settings.cache.enabled {
            return self.resolve(template, chain);
        }
        if let Some(cached) = self.cache.get(template, chain.id()) {
            tracing::trace!(template, "Resolution cache hit");
            return cached;
        }
        let resolved = self.resolve(template, chain);
        self.cache.insert(template, chain.id(), resolved)
    }

    /// Drops cached results for `template` under every chain.
    pub fn evict(&self, template: &str) {
        self.cache.evict(template);
    }

    /// Drops every cached result.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Returns the cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn expand(&self, text: &str, chain: &SourceChain, ctx: &mut ResolutionContext) -> String {
        let mut result = String::with_capacity(text.len());
        for segment in parse(text) {
            match segment {
                Segment::Literal(literal) => result.push_str(literal),
                Segment::Placeholder(token) => {
                    let replacement = self.expand_token(&token, chain, ctx);
                    result.push_str(&replacement);
                }
            }
        }
        result
    }

    fn expand_token(
        &self,
        token: &PlaceholderToken<'_>,
        chain: &SourceChain,
        ctx: &mut ResolutionContext,
    ) -> String {
        let key = token.key();
        let default_value = token.default_value();

        if ctx.is_active(key) {
            tracing::warn!(key, depth = ctx.depth(), "Circular placeholder reference");
            return Self::circular(token, ctx);
        }

        if let Some(done) = ctx.expanded(key, default_value) {
            tracing::trace!(key, "Reusing expansion from this call");
            return done.to_string();
        }

        let replacement = match resolve_key(key, default_value, chain) {
            ResolvedValue::Found { value, .. } | ResolvedValue::Default(value) => value,
            ResolvedValue::Unresolved => {
                tracing::debug!(key, "Unresolved placeholder kept verbatim");
                ctx.record_unresolved(key);
                return token.raw_text().to_string();
            }
        };

        if !has_placeholders(&replacement) {
            ctx.store_expanded(key, default_value, &replacement);
            return replacement;
        }

        if ctx.depth() >= self.settings.max_depth {
            if Self::leads_back(key, &replacement, chain, ctx) {
                tracing::warn!(
                    key,
                    max_depth = self.settings.max_depth,
                    "Circular placeholder reference beyond depth limit"
                );
                return Self::circular(token, ctx);
            }
            tracing::warn!(
                key,
                max_depth = self.settings.max_depth,
                "Expansion depth limit reached, value left unexpanded"
            );
            ctx.record_truncated();
            return replacement;
        }

        ctx.enter(key);
        let expanded = self.expand(&replacement, chain, ctx);
        ctx.leave();
        ctx.store_expanded(key, default_value, &expanded);
        expanded
    }

    fn circular(token: &PlaceholderToken<'_>, ctx: &mut ResolutionContext) -> String {
        ctx.record_circular(token.key());
        token
            .default_value()
            .map_or_else(|| circular_marker(token.key()), String::from)
    }

    /// Follows references out of `value` without expanding anything and
    /// reports whether they reach `key` or a key on the active path. Each key
    /// is looked up at most once.
    fn leads_back(key: &str, value: &str, chain: &SourceChain, ctx: &ResolutionContext) -> bool {
        let mut seen = HashSet::from([key.to_string()]);
        let mut pending = vec![value.to_string()];

        while let Some(text) = pending.pop() {
            for token in placeholders(&text) {
                let next = token.key();
                if next == key || ctx.is_active(next) {
                    return true;
                }
                if !seen.insert(next.to_string()) {
                    continue;
                }
                match resolve_key(next, token.default_value(), chain) {
                    ResolvedValue::Found { value, .. } | ResolvedValue::Default(value) => {
                        pending.push(value);
                    }
                    ResolvedValue::Unresolved => {}
                }
            }
        }
        false
    }
}
