//! Irriga CLI - irrigation decision support
//!
//! Compares the rule engine (Prolog) against the AI engine for one field.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;
mod progress;
mod session;

use commands::Cli;

const DEFAULT_FILTER: &str = "irriga=info,irriga_core=info,irriga_client=info";
const VERBOSE_FILTER: &str = "irriga=debug,irriga_core=debug,irriga_client=debug";

/// Initialize tracing on stderr, keeping stdout for command output.
fn init_tracing(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.execute().await
}
