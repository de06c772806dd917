//! aro-bootstrap - prepare an Azure subscription for Azure Red Hat OpenShift.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aro_bootstrap::cli::output;
use aro_bootstrap::cli::{execute, Cli};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("ARO_BOOTSTRAP_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("aro_bootstrap=debug")
        } else {
            EnvFilter::new("aro_bootstrap=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli.command) {
        output::error(&e.to_string());
        if let Some(hint) = e.hint() {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
