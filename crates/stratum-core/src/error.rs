//! Error types for Stratum.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Stratum operations.
pub type Result<T> = std::result::Result<T, StratumError>;

/// Main error type.
///
/// Placeholder resolution itself never fails; these errors come from the
/// edges around it: identifier validation, namespace loading, the config
/// client stand-in and settings.
#[derive(Debug, Error)]
pub enum StratumError {
    /// An identifier (application, cluster or namespace) is invalid.
    #[error("invalid {kind} '{value}': {reason}")]
    InvalidIdentifier {
        /// Which identifier was being validated.
        kind: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A namespace file could not be parsed.
    #[error("failed to parse '{source_name}': {message}")]
    ParseError {
        /// File or namespace being parsed.
        source_name: String,
        /// Parser message.
        message: String,
    },

    /// A configuration backend failed to answer.
    #[error("source '{backend}' failed: {message}")]
    SourceError {
        /// Backend identifier.
        backend: String,
        /// Failure description.
        message: String,
    },

    /// The requested namespace does not exist.
    #[error("namespace not found: {namespace}")]
    NamespaceNotFound {
        /// The missing namespace.
        namespace: String,
    },

    /// Reading from the filesystem failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StratumError {
    /// Creates an [`StratumError::InvalidIdentifier`] error.
    pub fn invalid_identifier(
        kind: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidIdentifier {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`StratumError::ParseError`] error.
    pub fn parse_error(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a [`StratumError::SourceError`] error.
    pub fn source_error(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceError {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Creates a [`StratumError::NamespaceNotFound`] error.
    pub fn namespace_not_found(namespace: impl Into<String>) -> Self {
        Self::NamespaceNotFound {
            namespace: namespace.into(),
        }
    }

    /// Creates a [`StratumError::Io`] error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a [`StratumError::Config`] error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true if this error came from a configuration backend.
    #[must_use]
    pub const fn is_source_error(&self) -> bool {
        matches!(self, Self::SourceError { .. })
    }

    /// Returns true if this error is a validation failure.
    #[must_use]
    pub const fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier { .. })
    }
}
