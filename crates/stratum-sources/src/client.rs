//! Configuration client capability and an in-memory implementation.
//!
//! The real configuration client (remote fetch, long polling, local disk
//! cache) lives outside this workspace. [`NamespaceClient`] is the narrow
//! lookup surface the adapters need, and [`InMemoryConfigClient`] implements
//! it for tests and the command line tool.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use stratum_core::{AppId, ClusterName, NamespaceName, PropertySource, Result, StratumError};

/// Per-namespace property lookup offered by a configuration client.
pub trait NamespaceClient: Send + Sync {
    /// Looks up a property in a namespace.
    ///
    /// An unknown namespace or key is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot answer (for example, the
    /// service is unreachable and nothing is cached).
    fn get_property(&self, namespace: &NamespaceName, key: &str) -> Result<Option<String>>;
}

impl<T: NamespaceClient + ?Sized> NamespaceClient for Arc<T> {
    fn get_property(&self, namespace: &NamespaceName, key: &str) -> Result<Option<String>> {
        (**self).get_property(namespace, key)
    }
}

/// Kind of change applied to a single property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// The key did not exist before.
    Added,
    /// The key existed with a different value.
    Modified,
    /// The key was removed.
    Deleted,
}

/// Change of one property inside a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    /// The property key.
    pub key: String,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// What happened.
    pub change_type: ChangeType,
}

/// Notification that properties in a namespace changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Namespace the changes belong to.
    pub namespace: NamespaceName,
    /// Changes, ordered by key.
    pub changes: Vec<PropertyChange>,
}

impl ChangeEvent {
    /// Returns the changed keys.
    #[must_use]
    pub fn changed_keys(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.key.as_str()).collect()
    }

    /// Returns the change for a key, if it changed.
    #[must_use]
    pub fn change(&self, key: &str) -> Option<&PropertyChange> {
        self.changes.iter().find(|c| c.key == key)
    }

    /// Returns true if the given key changed.
    #[must_use]
    pub fn is_changed(&self, key: &str) -> bool {
        self.change(key).is_some()
    }
}

/// Callback invoked for every [`ChangeEvent`].
pub type ChangeListener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

fn diff(old: &PropertySource, new: &PropertySource) -> Vec<PropertyChange> {
    let keys: BTreeSet<&str> = old.keys().into_iter().chain(new.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let before = old.get(key);
            let after = new.get(key);
            let change_type = match (before, after) {
                (None, Some(_)) => ChangeType::Added,
                (Some(_), None) => ChangeType::Deleted,
                (Some(b), Some(a)) if b != a => ChangeType::Modified,
                _ => return None,
            };
            Some(PropertyChange {
                key: key.to_string(),
                old_value: before.map(String::from),
                new_value: after.map(String::from),
                change_type,
            })
        })
        .collect()
}

/// An in-process configuration client.
///
/// Namespaces are published wholesale or edited one property at a time.
/// Every effective change is delivered to registered listeners after the
/// internal lock has been released, so listeners may call back into the
/// client.
pub struct InMemoryConfigClient {
    app_id: AppId,
    cluster: ClusterName,
    namespaces: RwLock<HashMap<NamespaceName, PropertySource>>,
    listeners: RwLock<Vec<ChangeListener>>,
    offline: AtomicBool,
}

impl InMemoryConfigClient {
    /// Creates a client for an application in the default cluster.
    pub fn new(app_id: impl Into<AppId>) -> Self {
        Self::with_cluster(app_id, ClusterName::default_cluster())
    }

    /// Creates a client for an application in a specific cluster.
    pub fn with_cluster(app_id: impl Into<AppId>, cluster: impl Into<ClusterName>) -> Self {
        Self {
            app_id: app_id.into(),
            cluster: cluster.into(),
            namespaces: RwLock::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Returns the application id.
    #[must_use]
    pub const fn app_id(&self) -> &AppId {
        &self.app_id
    }

    /// Returns the cluster.
    #[must_use]
    pub const fn cluster(&self) -> &ClusterName {
        &self.cluster
    }

    /// Registers a listener for change events.
    pub fn add_change_listener(&self, listener: ChangeListener) {
        self.listeners.write().push(listener);
    }

    /// Replaces the contents of a namespace.
    ///
    /// Returns the resulting change event, which is also delivered to the
    /// listeners unless it is empty.
    pub fn publish(&self, namespace: impl Into<NamespaceName>, source: PropertySource) -> ChangeEvent {
        let namespace = namespace.into();
        let changes = {
            let mut namespaces = self.namespaces.write();
            let previous = namespaces
                .insert(namespace.clone(), source)
                .unwrap_or_default();
            let current = namespaces.get(&namespace).cloned().unwrap_or_default();
            diff(&previous, &current)
        };
        self.emit(ChangeEvent { namespace, changes })
    }

    /// Sets a single property, creating the namespace if needed.
    pub fn set_property(
        &self,
        namespace: impl Into<NamespaceName>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> ChangeEvent {
        let namespace = namespace.into();
        let (key, value) = (key.into(), value.into());
        let changes = {
            let mut namespaces = self.namespaces.write();
            let entry = namespaces
                .entry(namespace.clone())
                .or_insert_with(|| PropertySource::empty(namespace.as_str()));
            let previous = entry.insert(key.clone(), value.clone());
            match previous {
                Some(old) if old == value => Vec::new(),
                old => vec![PropertyChange {
                    change_type: if old.is_some() {
                        ChangeType::Modified
                    } else {
                        ChangeType::Added
                    },
                    key,
                    old_value: old,
                    new_value: Some(value),
                }],
            }
        };
        self.emit(ChangeEvent { namespace, changes })
    }

    /// Removes a single property.
    pub fn remove_property(&self, namespace: impl Into<NamespaceName>, key: &str) -> ChangeEvent {
        let namespace = namespace.into();
        let removed = self
            .namespaces
            .write()
            .get_mut(&namespace)
            .and_then(|source| source.remove(key));
        let changes = removed
            .map(|old| PropertyChange {
                key: key.to_string(),
                old_value: Some(old),
                new_value: None,
                change_type: ChangeType::Deleted,
            })
            .into_iter()
            .collect();
        self.emit(ChangeEvent { namespace, changes })
    }

    /// Returns a snapshot of a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StratumError::NamespaceNotFound`] if it was never published.
    pub fn namespace(&self, namespace: &NamespaceName) -> Result<PropertySource> {
        self.namespaces
            .read()
            .get(namespace)
            .cloned()
            .ok_or_else(|| StratumError::namespace_not_found(namespace.as_str()))
    }

    /// Returns the published namespace names, sorted.
    #[must_use]
    pub fn namespace_names(&self) -> Vec<NamespaceName> {
        let mut names: Vec<NamespaceName> = self.namespaces.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Simulates losing (or regaining) the connection to the service.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns true if lookups currently fail.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    fn emit(&self, event: ChangeEvent) -> ChangeEvent {
        if event.changes.is_empty() {
            return event;
        }
        tracing::debug!(
            namespace = %event.namespace,
            changes = event.changes.len(),
            "Namespace changed"
        );
        let listeners = self.listeners.read().clone();
        for listener in &listeners {
            listener(&event);
        }
        event
    }
}

impl NamespaceClient for InMemoryConfigClient {
    fn get_property(&self, namespace: &NamespaceName, key: &str) -> Result<Option<String>> {
        if self.is_offline() {
            return Err(StratumError::source_error(
                format!("{}/{}", self.app_id, self.cluster),
                "configuration service unreachable",
            ));
        }
        Ok(self
            .namespaces
            .read()
            .get(namespace)
            .and_then(|source| source.get(key))
            .map(String::from))
    }
}

impl fmt::Debug for InMemoryConfigClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryConfigClient")
            .field("app_id", &self.app_id)
            .field("cluster", &self.cluster)
            .field("namespaces", &self.namespace_names())
            .field("offline", &self.is_offline())
            .finish_non_exhaustive()
    }
}
