//! Stratum command line front end.
//!
//! Builds a [`SourceChain`] from namespace files, `-D` properties, the
//! environment and an optional fallback, then resolves each template given
//! on the command line.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stratum_core::{NamespaceName, SourceChain};
use stratum_resolver::{CIRCULAR_MARKER_PREFIX, EngineSettings, PlaceholderEngine, Resolution};
use stratum_sources::{
    ConfigNamespace, EnvironmentVariable, InMemoryConfigClient, LiteralDefault, SystemProperties,
    SystemProperty, load_namespace_dir,
};

/// Exit status used by `--strict` when some template is incomplete.
pub const EXIT_INCOMPLETE: u8 = 2;

/// Process exit status for a successful run.
///
/// Under `--strict`, any printed line that still contains `${` or a
/// circular marker yields [`EXIT_INCOMPLETE`].
#[must_use]
pub fn exit_status(cli: &Cli, resolutions: &[Resolution]) -> u8 {
    let incomplete = resolutions.iter().any(|resolution| {
        resolution.value.contains("${") || resolution.value.contains(CIRCULAR_MARKER_PREFIX)
    });
    if cli.strict && incomplete {
        EXIT_INCOMPLETE
    } else {
        0
    }
}

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "stratum",
    version,
    about = "Resolve ${key:default} placeholders against layered configuration"
)]
pub struct Cli {
    /// Engine settings file (TOML, YAML or JSON)
    #[arg(long, env = "STRATUM_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory of namespace files (*.properties, *.yml, *.yaml, *.json)
    #[arg(long, value_name = "DIR")]
    pub namespace_dir: Option<PathBuf>,

    /// Namespace to consult, highest precedence first (default: application)
    #[arg(short = 'n', long = "namespace", value_name = "NAMESPACE")]
    pub namespaces: Vec<String>,

    /// System property, may be repeated
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub properties: Vec<(String, String)>,

    /// Do not consult environment variables
    #[arg(long)]
    pub no_env: bool,

    /// Prefix prepended to environment variable names
    #[arg(long, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Value for any key no other source has
    #[arg(long, value_name = "VALUE")]
    pub fallback: Option<String>,

    /// Exit with status 2 if any placeholder stays unresolved or circular
    #[arg(long)]
    pub strict: bool,

    /// Templates to resolve
    #[arg(required = true, value_name = "TEMPLATE")]
    pub templates: Vec<String>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Builds the source chain described by the arguments.
///
/// Order: namespaces (as given), system properties, environment, fallback.
/// `-D` properties are written into `system`.
///
/// # Errors
///
/// Returns an error if a namespace name is invalid or the namespace
/// directory cannot be loaded.
pub fn build_chain(cli: &Cli, system: &SystemProperties) -> anyhow::Result<SourceChain> {
    let mut builder = SourceChain::builder();

    if let Some(dir) = &cli.namespace_dir {
        let client = Arc::new(InMemoryConfigClient::new("stratum-cli"));
        let loaded = load_namespace_dir(dir)
            .with_context(|| format!("failed to load namespaces from {}", dir.display()))?;
        for (namespace, source) in loaded {
            client.publish(namespace, source);
        }

        let wanted = if cli.namespaces.is_empty() {
            vec![NamespaceName::application()]
        } else {
            cli.namespaces
                .iter()
                .map(|name| NamespaceName::parse(name.as_str()))
                .collect::<Result<Vec<_>, _>>()?
        };
        for namespace in wanted {
            if client.namespace(&namespace).is_err() {
                tracing::warn!(%namespace, dir = %dir.display(), "Namespace not found");
            }
            builder = builder.source(ConfigNamespace::new(client.clone(), namespace));
        }
    }

    for (key, value) in &cli.properties {
        system.set(key, value);
    }
    builder = builder.source(SystemProperty::from_registry(system.clone()));

    if !cli.no_env {
        let mut env = EnvironmentVariable::new().relaxed();
        if let Some(prefix) = &cli.env_prefix {
            env = env.with_prefix(prefix);
        }
        builder = builder.source(env);
    }

    if let Some(fallback) = &cli.fallback {
        builder = builder.source(LiteralDefault::new(fallback));
    }

    let chain = builder.build();
    tracing::debug!(sources = ?chain.names(), "Built source chain");
    Ok(chain)
}

/// Resolves every template, writing one line per result to `out`.
///
/// Returns the detailed resolutions in template order.
///
/// # Errors
///
/// Returns an error if settings or namespaces cannot be loaded, or writing
/// to `out` fails.
pub fn run(
    cli: &Cli,
    system: &SystemProperties,
    out: &mut impl Write,
) -> anyhow::Result<Vec<Resolution>> {
    let settings = EngineSettings::load(cli.config.as_deref()).context("failed to load settings")?;
    let engine = PlaceholderEngine::with_settings(settings);
    let chain = build_chain(cli, system)?;

    let mut resolutions = Vec::with_capacity(cli.templates.len());
    for template in &cli.templates {
        let resolution = engine.resolve_detailed(template, &chain);
        writeln!(out, "{}", resolution.value)?;
        if !resolution.is_complete() {
            tracing::warn!(
                template = %template,
                unresolved = ?resolution.unresolved,
                circular = ?resolution.circular,
                "Template not fully resolved"
            );
        }
        resolutions.push(resolution);
    }
    Ok(resolutions)
}
