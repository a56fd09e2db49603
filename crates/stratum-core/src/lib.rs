//! Stratum Core - shared types and traits
//!
//! This crate provides the foundational types for resolving `${key[:default]}`
//! placeholders against layered configuration sources.
//!
//! # Key Types
//!
//! - [`KeyValueSource`]: A read-only key/value lookup capability
//! - [`SourceChain`]: An ordered, immutable chain of sources (first source wins)
//! - [`PropertySource`]: An in-memory, named set of properties
//! - [`AppId`], [`ClusterName`], [`NamespaceName`]: Identifiers for configuration
//! - [`StratumError`]: Main error type
//! - [`Result`]: Type alias for `Result<T, StratumError>`

mod config;
mod error;
mod source;
mod types;

pub use config::PropertySource;
pub use error::{Result, StratumError};
pub use source::{ChainId, KeyValueSource, SourceChain, SourceChainBuilder, SourceError};
pub use types::{AppId, ClusterName, NamespaceName};

/// Returns the crate version.
#[must_use]
pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
