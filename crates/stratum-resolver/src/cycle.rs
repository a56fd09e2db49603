//! Per-call state for recursive expansion and cycle detection.

use std::collections::{BTreeSet, HashMap};

/// Prefix of the marker emitted for a circular reference without default.
pub const CIRCULAR_MARKER_PREFIX: &str = "[CIRCULAR:";

/// Returns the marker substituted for a circular reference to `key`.
#[must_use]
pub fn circular_marker(key: &str) -> String {
    format!("{CIRCULAR_MARKER_PREFIX}{key}]")
}

/// State owned by one top-level resolution and threaded through every
/// recursive step.
///
/// A context is created fresh for each call and dropped when it returns; it
/// is never stored on the engine. `visited` only grows. The active path is
/// the stack of keys whose values are currently being expanded, and is what
/// cycles are detected against. Each `(key, default)` pair is expanded at
/// most once per call; later references reuse the stored text.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    visited: BTreeSet<String>,
    path: Vec<String>,
    expanded: HashMap<(String, Option<String>), String>,
    unresolved: Vec<String>,
    circular: Vec<String>,
    truncated: bool,
}

impl ResolutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if expanding `key` now would re-enter its own value.
    #[must_use]
    pub fn is_active(&self, key: &str) -> bool {
        self.path.iter().any(|k| k == key)
    }

    /// Current expansion depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Marks `key` as visited and makes it the innermost active key.
    pub fn enter(&mut self, key: &str) {
        self.visited.insert(key.to_string());
        self.path.push(key.to_string());
    }

    /// Leaves the innermost active key.
    pub fn leave(&mut self) {
        self.path.pop();
    }

    /// Returns the text already produced for `key` with `default` in this
    /// call, if any.
    #[must_use]
    pub fn expanded(&self, key: &str, default: Option<&str>) -> Option<&str> {
        self.expanded
            .get(&(key.to_string(), default.map(String::from)))
            .map(String::as_str)
    }

    /// Stores the text produced for `key` with `default`.
    pub fn store_expanded(&mut self, key: &str, default: Option<&str>, value: &str) {
        self.expanded
            .insert((key.to_string(), default.map(String::from)), value.to_string());
    }

    /// Records a placeholder left unresolved.
    pub fn record_unresolved(&mut self, key: &str) {
        self.unresolved.push(key.to_string());
    }

    /// Records a circular reference.
    pub fn record_circular(&mut self, key: &str) {
        self.circular.push(key.to_string());
    }

    /// Records that expansion stopped at the depth limit.
    pub const fn record_truncated(&mut self) {
        self.truncated = true;
    }

    /// Keys whose values were expanded during this call.
    #[must_use]
    pub const fn visited(&self) -> &BTreeSet<String> {
        &self.visited
    }

    /// Consumes the context into the diagnostics of a [`Resolution`].
    #[must_use]
    pub fn finish(self, value: String) -> Resolution {
        Resolution {
            value,
            unresolved: self.unresolved,
            circular: self.circular,
            visited: self.visited,
            truncated: self.truncated,
        }
    }
}

/// Result of resolving a template, with diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The resolved string.
    pub value: String,
    /// Keys left unresolved (their placeholder text was kept).
    pub unresolved: Vec<String>,
    /// Keys that closed a reference cycle.
    pub circular: Vec<String>,
    /// Keys whose values were recursively expanded.
    pub visited: BTreeSet<String>,
    /// Whether some value was left unexpanded at the depth limit.
    pub truncated: bool,
}

impl Resolution {
    /// Returns true if every placeholder was resolved without cycles or
    /// truncation.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty() && self.circular.is_empty() && !self.truncated
    }
}
