//! Placeholder resolution
//!
//! Resolves `${key}` and `${key:default}` placeholders against an ordered
//! [`SourceChain`](stratum_core::SourceChain).
//!
//! # Usage
//!
//! ```
//! use stratum_core::{PropertySource, SourceChain};
//! use stratum_resolver::PlaceholderEngine;
//!
//! let overrides = PropertySource::empty("overrides").with("k", "x");
//! let defaults = PropertySource::empty("defaults").with("k", "y");
//! let chain = SourceChain::builder().source(overrides).source(defaults).build();
//!
//! let engine = PlaceholderEngine::new();
//! assert_eq!(engine.resolve("${k}", &chain), "x");
//! assert_eq!(engine.resolve("${missing:default}", &chain), "default");
//! assert_eq!(engine.resolve("${missing}", &chain), "${missing}");
//! ```

pub mod cache;
pub mod cycle;
pub mod engine;
pub mod parser;
pub mod precedence;
pub mod settings;

pub use cache::{CacheStats, ResolutionCache};
pub use cycle::{CIRCULAR_MARKER_PREFIX, Resolution, ResolutionContext, circular_marker};
pub use engine::PlaceholderEngine;
pub use parser::{
    PlaceholderToken, Segment, Segments, extract_keys, has_placeholders, parse, placeholders,
};
pub use precedence::{ResolvedValue, resolve_key};
pub use settings::{CacheSettings, DEFAULT_MAX_DEPTH, EngineSettings};
