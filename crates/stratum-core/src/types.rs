//! Identifier types for configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StratumError};

fn validate(kind: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StratumError::invalid_identifier(
            kind,
            value,
            "must not be empty",
        ));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(StratumError::invalid_identifier(
            kind,
            value,
            "must not contain whitespace",
        ));
    }
    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier without validation.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Creates an identifier, rejecting empty values and whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`StratumError::InvalidIdentifier`] if the value is invalid.
            pub fn parse(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                validate($kind, &value)?;
                Ok(Self(value))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Application identifier registered with the configuration service.
    AppId,
    "application id"
);

identifier!(
    /// Cluster the application reads its configuration from.
    ClusterName,
    "cluster"
);

identifier!(
    /// Name of a namespace: one logical set of properties.
    NamespaceName,
    "namespace"
);

impl ClusterName {
    /// The cluster used when none is configured.
    #[must_use]
    pub fn default_cluster() -> Self {
        Self::new("default")
    }
}

impl NamespaceName {
    /// The namespace every application owns.
    #[must_use]
    pub fn application() -> Self {
        Self::new("application")
    }
}
