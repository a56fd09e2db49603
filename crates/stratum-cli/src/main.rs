//! Stratum command line binary.

use std::process::ExitCode;

use clap::Parser;
use stratum_cli::{Cli, exit_status, run};
use stratum_sources::SystemProperties;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!("Starting stratum v{}", env!("CARGO_PKG_VERSION"));

    let mut stdout = std::io::stdout().lock();
    match run(&cli, &SystemProperties::global(), &mut stdout) {
        Ok(resolutions) => ExitCode::from(exit_status(&cli, &resolutions)),
        Err(error) => {
            eprintln!("stratum: {error:#}");
            ExitCode::FAILURE
        }
    }
}
