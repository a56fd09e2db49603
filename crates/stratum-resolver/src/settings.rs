//! Engine settings.
//!
//! Layered from built-in defaults, an optional settings file and
//! `STRATUM__`-prefixed environment variables (`STRATUM__CACHE__ENABLED=false`).

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use stratum_core::{Result, StratumError};

/// Default bound on recursive expansion depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings for the resolution cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Whether `resolve_with_cache` stores and reuses results.
    pub enabled: bool,
    /// Maximum number of stored entries; unbounded when absent.
    pub max_entries: Option<usize>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: None,
        }
    }
}

/// Settings for [`crate::PlaceholderEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maximum nesting of recursively expanded values.
    pub max_depth: usize,
    /// Cache settings.
    pub cache: CacheSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            cache: CacheSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Loads settings from an optional file plus the environment.
    ///
    /// A missing file is an error only when a path was given explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`StratumError::Config`] if a source cannot be read or a value
    /// has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(
                Environment::with_prefix("STRATUM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| StratumError::config(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.max_entries, None);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stratum.toml");
        fs::write(&path, "max_depth = 8\n\n[cache]\nmax_entries = 100\n").unwrap();

        let settings = EngineSettings::load(Some(&path)).unwrap();

        assert_eq!(settings.max_depth, 8);
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.max_entries, Some(100));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stratum.yaml");
        fs::write(&path, "cache:\n  enabled: false\n").unwrap();

        let settings = EngineSettings::load(Some(&path)).unwrap();

        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!settings.cache.enabled);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = EngineSettings::load(Some(Path::new("/no/such/stratum.toml"))).unwrap_err();
        assert!(matches!(err, StratumError::Config(_)));
    }

    #[test]
    fn test_wrong_type_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stratum.toml");
        fs::write(&path, "max_depth = \"deep\"\n").unwrap();

        assert!(EngineSettings::load(Some(&path)).is_err());
    }
}
