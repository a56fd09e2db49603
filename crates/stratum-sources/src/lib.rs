//! Stratum Sources - key/value source adapters
//!
//! Adapters that expose configuration data as [`stratum_core::KeyValueSource`]s:
//!
//! - [`ConfigNamespace`]: one namespace of a [`NamespaceClient`]
//! - [`SystemProperty`]: the process-wide [`SystemProperties`] registry
//! - [`EnvironmentVariable`]: process environment or a fixed snapshot
//! - [`LiteralDefault`]: a fixed value, used to seed a chain's tail
//!
//! The [`InMemoryConfigClient`] stands in for a remote configuration
//! service and publishes [`ChangeEvent`]s to registered listeners.

pub mod client;
pub mod env;
pub mod format;
pub mod literal;
pub mod namespace;
pub mod system;

pub use client::{
    ChangeEvent, ChangeListener, ChangeType, InMemoryConfigClient, NamespaceClient, PropertyChange,
};
pub use env::EnvironmentVariable;
pub use format::{NamespaceFormat, load_namespace_dir, load_namespace_file, parse_namespace};
pub use literal::LiteralDefault;
pub use namespace::ConfigNamespace;
pub use system::{SystemProperties, SystemProperty};
