//! Environment variable source.

use std::collections::HashMap;
use std::env::VarError;

use stratum_core::{KeyValueSource, SourceError};

#[derive(Debug, Clone)]
enum Backing {
    Process,
    Snapshot(HashMap<String, String>),
}

/// A [`KeyValueSource`] over environment variables.
///
/// Lookups try the key as given first. With [`relaxed`](Self::relaxed)
/// binding, `db.pool-size` also matches `DB_POOL_SIZE`. An optional prefix is
/// prepended to every candidate name.
///
/// # Example
///
/// ```
/// use stratum_core::KeyValueSource;
/// use stratum_sources::EnvironmentVariable;
///
/// let env = EnvironmentVariable::from_vars([("APP_SERVER_PORT", "9090")])
///     .with_prefix("APP_")
///     .relaxed();
///
/// assert_eq!(env.get("server.port").unwrap().as_deref(), Some("9090"));
/// ```
#[derive(Debug, Clone)]
pub struct EnvironmentVariable {
    backing: Backing,
    prefix: String,
    relaxed: bool,
}

impl EnvironmentVariable {
    /// Reads the live process environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backing: Backing::Process,
            prefix: String::new(),
            relaxed: false,
        }
    }

    /// Reads a fixed set of variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            backing: Backing::Snapshot(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            prefix: String::new(),
            relaxed: false,
        }
    }

    /// Prepends `prefix` to every looked-up name.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Also tries the upper-cased, underscore-separated form of the key.
    #[must_use]
    pub const fn relaxed(mut self) -> Self {
        self.relaxed = true;
        self
    }

    fn candidates(&self, key: &str) -> Vec<String> {
        let mut names = vec![format!("{}{key}", self.prefix)];
        if self.relaxed {
            let normalized: String = key
                .chars()
                .map(|c| match c {
                    '.' | '-' => '_',
                    other => other.to_ascii_uppercase(),
                })
                .collect();
            let relaxed = format!("{}{normalized}", self.prefix);
            if relaxed != names[0] {
                names.push(relaxed);
            }
        }
        names
    }

    fn lookup(&self, name: &str, key: &str) -> Result<Option<String>, SourceError> {
        match &self.backing {
            Backing::Snapshot(vars) => Ok(vars.get(name).cloned()),
            Backing::Process => match std::env::var(name) {
                Ok(value) => Ok(Some(value)),
                Err(VarError::NotPresent) => Ok(None),
                Err(VarError::NotUnicode(_)) => Err(SourceError::invalid_value(
                    self.name(),
                    key,
                    format!("environment variable {name} is not valid unicode"),
                )),
            },
        }
    }
}

impl Default for EnvironmentVariable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueSource for EnvironmentVariable {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Result<Option<String>, SourceError> {
        for name in self.candidates(key) {
            if let Some(value) = self.lookup(&name, key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
