//! Adapter exposing one namespace of a configuration client.

use std::sync::Arc;

use stratum_core::{KeyValueSource, NamespaceName, SourceError};

use crate::client::NamespaceClient;

/// A [`KeyValueSource`] backed by one namespace of a [`NamespaceClient`].
///
/// Which namespaces to expose, and in what order, is the caller's choice:
/// add one `ConfigNamespace` per namespace to the chain.
pub struct ConfigNamespace {
    name: String,
    namespace: NamespaceName,
    client: Arc<dyn NamespaceClient>,
}

impl ConfigNamespace {
    /// Creates an adapter for `namespace`.
    pub fn new(client: Arc<dyn NamespaceClient>, namespace: impl Into<NamespaceName>) -> Self {
        let namespace = namespace.into();
        Self {
            name: format!("namespace:{namespace}"),
            namespace,
            client,
        }
    }

    /// Returns the namespace this adapter reads.
    #[must_use]
    pub const fn namespace(&self) -> &NamespaceName {
        &self.namespace
    }
}

impl KeyValueSource for ConfigNamespace {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<String>, SourceError> {
        self.client
            .get_property(&self.namespace, key)
            .map_err(|e| SourceError::unavailable(self.name.as_str(), e.to_string()))
    }
}

impl std::fmt::Debug for ConfigNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigNamespace")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
