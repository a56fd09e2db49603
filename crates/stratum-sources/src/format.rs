//! Namespace file formats.
//!
//! `.properties` namespaces are named after the file stem
//! (`application.properties` → `application`); every other format keeps its
//! full file name (`datasource.yml`). Structured documents are flattened to
//! dotted keys, with `[i]` suffixes for sequence items.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use stratum_core::{NamespaceName, PropertySource, Result, StratumError};

/// Supported namespace file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceFormat {
    /// Java-style `key=value` properties.
    Properties,
    /// YAML document.
    Yaml,
    /// JSON document.
    Json,
}

impl NamespaceFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "properties" => Some(Self::Properties),
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn namespace_name(self, path: &Path) -> Option<String> {
        let name = match self {
            Self::Properties => path.file_stem()?,
            Self::Yaml | Self::Json => path.file_name()?,
        };
        name.to_str().map(String::from)
    }
}

/// Parses namespace content.
///
/// # Errors
///
/// Returns [`StratumError::ParseError`] if the content is malformed or a
/// structured document is not a mapping at the top level.
pub fn parse_namespace(name: &str, format: NamespaceFormat, content: &str) -> Result<PropertySource> {
    let properties = match format {
        NamespaceFormat::Properties => java_properties::read(content.as_bytes())
            .map_err(|e| StratumError::parse_error(name, e.to_string()))?,
        NamespaceFormat::Yaml => {
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                let value: Value = serde_yaml::from_str(content)
                    .map_err(|e| StratumError::parse_error(name, e.to_string()))?;
                flatten_document(name, &value)?
            }
        }
        NamespaceFormat::Json => {
            let value: Value = serde_json::from_str(content)
                .map_err(|e| StratumError::parse_error(name, e.to_string()))?;
            flatten_document(name, &value)?
        }
    };
    Ok(PropertySource::new(name, properties))
}

fn flatten_document(name: &str, value: &Value) -> Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    match value {
        Value::Object(_) => flatten("", value, &mut out),
        Value::Null => {}
        _ => {
            return Err(StratumError::parse_error(
                name,
                "top-level element must be a mapping",
            ));
        }
    }
    Ok(out)
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&format!("{prefix}[{index}]"), child, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Null => {
            out.insert(prefix.to_string(), String::new());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Loads one namespace file.
///
/// # Errors
///
/// Returns an error if the extension is unsupported, the file cannot be
/// read, or its content cannot be parsed.
pub fn load_namespace_file(path: &Path) -> Result<(NamespaceName, PropertySource)> {
    let format = NamespaceFormat::from_path(path).ok_or_else(|| {
        StratumError::parse_error(path.display().to_string(), "unsupported namespace format")
    })?;
    let name = format.namespace_name(path).ok_or_else(|| {
        StratumError::parse_error(path.display().to_string(), "file name is not valid unicode")
    })?;
    let namespace = NamespaceName::parse(name.as_str())?;
    let content = std::fs::read_to_string(path).map_err(|e| StratumError::io(path, e))?;
    let source = parse_namespace(&name, format, &content)?;

    tracing::debug!(
        namespace = %namespace,
        properties = source.len(),
        path = %path.display(),
        "Loaded namespace"
    );
    Ok((namespace, source))
}

/// Loads every supported namespace file in a directory (not recursive),
/// sorted by namespace name. Unsupported files are skipped.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or any supported file
/// fails to load.
pub fn load_namespace_dir(dir: &Path) -> Result<Vec<(NamespaceName, PropertySource)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| StratumError::io(dir, e))?;

    let mut namespaces = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StratumError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        if NamespaceFormat::from_path(&path).is_none() {
            tracing::trace!(path = %path.display(), "Skipping unsupported file");
            continue;
        }
        namespaces.push(load_namespace_file(&path)?);
    }
    namespaces.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(namespaces)
}
