//! Memoization of resolved templates.
//!
//! Entries are keyed by template text and [`ChainId`], so results for
//! different chains never overwrite each other. The cache never expires
//! anything on its own; whoever observes source changes calls
//! [`ResolutionCache::evict`] or [`ResolutionCache::clear`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use stratum_core::ChainId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    template: String,
    chain: ChainId,
}

impl CacheKey {
    fn new(template: &str, chain: ChainId) -> Self {
        Self {
            template: template.to_string(),
            chain,
        }
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that missed.
    pub misses: u64,
    /// Entries currently stored.
    pub entries: usize,
}

/// Concurrent map from (template, chain) to resolved value.
///
/// Lookups on different shards never contend, and lookups on the same shard
/// only take a shared lock. Concurrent inserts for the same key keep the
/// first value.
///
/// `reserved` counts stored entries plus inserts in flight. A slot is taken
/// before an entry is written, so `max_entries` holds under concurrent
/// inserts.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<CacheKey, String>,
    max_entries: Option<usize>,
    reserved: AtomicUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Creates an unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache that stops storing new entries once it holds
    /// `max_entries`. `None` means unbounded.
    #[must_use]
    pub fn with_max_entries(max_entries: Option<usize>) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    /// Looks up a resolved value.
    #[must_use]
    pub fn get(&self, template: &str, chain: ChainId) -> Option<String> {
        let found = self
            .entries
            .get(&CacheKey::new(template, chain))
            .map(|entry| entry.value().clone());

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Stores a resolved value unless one is already present, and returns
    /// the value that is now authoritative for the key.
    ///
    /// When the cache is full the value is returned without being stored.
    pub fn insert(&self, template: &str, chain: ChainId, value: String) -> String {
        let key = CacheKey::new(template, chain);

        if let Some(existing) = self.entries.get(&key) {
            return existing.value().clone();
        }

        if !self.reserve_slot() {
            tracing::debug!(max = ?self.max_entries, "Resolution cache full, not storing entry");
            return value;
        }

        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.release_slots(1);
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(value).value().clone(),
        }
    }

    /// Removes every entry for `template`, across all chains. Returns how
    /// many entries were removed.
    pub fn evict(&self, template: &str) -> usize {
        let removed = self.remove_where(|key| key.template == template);
        tracing::debug!(template, removed, "Evicted template from resolution cache");
        removed
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let removed = self.remove_where(|_| true);
        tracing::debug!(removed, "Cleared resolution cache");
    }

    fn remove_where(&self, mut matches: impl FnMut(&CacheKey) -> bool) -> usize {
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let keep = !matches(key);
            if !keep {
                removed += 1;
            }
            keep
        });
        self.release_slots(removed);
        removed
    }

    fn reserve_slot(&self) -> bool {
        match self.max_entries {
            None => {
                self.reserved.fetch_add(1, Ordering::AcqRel);
                true
            }
            Some(max) => self
                .reserved
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |taken| {
                    (taken < max).then_some(taken + 1)
                })
                .is_ok(),
        }
    }

    fn release_slots(&self, count: usize) {
        if count > 0 {
            self.reserved.fetch_sub(count, Ordering::AcqRel);
        }
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the current counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_core::SourceChain;

    #[test]
    fn test_miss_then_hit() {
        let cache = ResolutionCache::new();
        let chain = SourceChain::empty().id();

        assert_eq!(cache.get("${a}", chain), None);
        cache.insert("${a}", chain, "v".to_string());
        assert_eq!(cache.get("${a}", chain).as_deref(), Some("v"));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_first_writer_wins() {
        let cache = ResolutionCache::new();
        let chain = SourceChain::empty().id();

        assert_eq!(cache.insert("t", chain, "first".to_string()), "first");
        assert_eq!(cache.insert("t", chain, "second".to_string()), "first");
        assert_eq!(cache.get("t", chain).as_deref(), Some("first"));
    }

    #[test]
    fn test_chain_identity_separates_entries() {
        let cache = ResolutionCache::new();
        let (a, b) = (SourceChain::empty().id(), SourceChain::empty().id());

        cache.insert("t", a, "from-a".to_string());
        cache.insert("t", b, "from-b".to_string());

        assert_eq!(cache.get("t", a).as_deref(), Some("from-a"));
        assert_eq!(cache.get("t", b).as_deref(), Some("from-b"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_evict_removes_template_for_all_chains() {
        let cache = ResolutionCache::new();
        let (a, b) = (SourceChain::empty().id(), SourceChain::empty().id());
        cache.insert("t", a, "1".to_string());
        cache.insert("t", b, "2".to_string());
        cache.insert("other", a, "3".to_string());

        assert_eq!(cache.evict("t"), 2);
        assert_eq!(cache.get("t", a), None);
        assert_eq!(cache.get("other", a).as_deref(), Some("3"));
        assert_eq!(cache.evict("t"), 0);
    }

    #[test]
    fn test_clear() {
        let cache = ResolutionCache::new();
        cache.insert("t", SourceChain::empty().id(), "1".to_string());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_max_entries_bounds_storage() {
        let cache = ResolutionCache::with_max_entries(Some(1));
        let chain = SourceChain::empty().id();

        assert_eq!(cache.insert("a", chain, "1".to_string()), "1");
        assert_eq!(cache.insert("b", chain, "2".to_string()), "2");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b", chain), None);
        // an existing key is still answered from the cache
        assert_eq!(cache.insert("a", chain, "other".to_string()), "1");
    }

    #[test]
    fn test_removal_frees_slots() {
        let cache = ResolutionCache::with_max_entries(Some(1));
        let chain = SourceChain::empty().id();

        cache.insert("a", chain, "1".to_string());
        cache.evict("a");
        cache.insert("b", chain, "2".to_string());
        assert_eq!(cache.get("b", chain).as_deref(), Some("2"));

        cache.clear();
        cache.insert("c", chain, "3".to_string());
        assert_eq!(cache.get("c", chain).as_deref(), Some("3"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_max_entries_holds_under_concurrent_inserts() {
        let cache = ResolutionCache::with_max_entries(Some(8));
        let chain = SourceChain::empty().id();

        std::thread::scope(|scope| {
            for t in 0..16 {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..100 {
                        cache.insert(&format!("t{t}-{i}"), chain, "v".to_string());
                        if i % 10 == 0 {
                            cache.insert("shared", chain, "v".to_string());
                        }
                    }
                });
            }
        });

        assert_eq!(cache.len(), 8);
    }
}
