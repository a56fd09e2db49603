//! Wiring change notifications from a config client to cache invalidation.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use stratum_core::SourceChain;
use stratum_resolver::PlaceholderEngine;
use stratum_sources::{ChangeEvent, ConfigNamespace, InMemoryConfigClient};

#[test]
fn change_listener_clears_cache() {
    let engine = Arc::new(PlaceholderEngine::new());
    let client = Arc::new(InMemoryConfigClient::new("sample-app"));
    client.set_property("application", "endpoint", "http://old");

    let listener_engine = Arc::clone(&engine);
    client.add_change_listener(Arc::new(move |_event: &ChangeEvent| {
        listener_engine.clear();
    }));

    let chain = SourceChain::builder()
        .source(ConfigNamespace::new(client.clone(), "application"))
        .build();

    assert_eq!(engine.resolve_with_cache("${endpoint}/x", &chain), "http://old/x");

    client.set_property("application", "endpoint", "http://new");

    assert_eq!(engine.resolve_with_cache("${endpoint}/x", &chain), "http://new/x");
}

#[test]
fn listener_can_evict_selected_templates() {
    let engine = Arc::new(PlaceholderEngine::new());
    let client = Arc::new(InMemoryConfigClient::new("sample-app"));
    client.set_property("application", "a", "1");
    client.set_property("application", "b", "2");

    let listener_engine = Arc::clone(&engine);
    client.add_change_listener(Arc::new(move |event: &ChangeEvent| {
        for key in event.changed_keys() {
            listener_engine.evict(&format!("${{{key}}}"));
        }
    }));

    let chain = SourceChain::builder()
        .source(ConfigNamespace::new(client.clone(), "application"))
        .build();
    assert_eq!(engine.resolve_with_cache("${a}", &chain), "1");
    assert_eq!(engine.resolve_with_cache("${b}", &chain), "2");

    client.set_property("application", "a", "10");

    assert_eq!(engine.resolve_with_cache("${a}", &chain), "10");
    assert_eq!(engine.cache_stats().entries, 2);
}
