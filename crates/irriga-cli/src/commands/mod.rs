//! CLI command definitions and handlers.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use irriga_client::{AgentsClient, DEFAULT_REQUEST_TIMEOUT};
use irriga_core::constants::DEFAULT_API_URL;

pub mod admin;
pub mod analyze;
pub mod auth;

/// Irriga - compare rule-based and AI irrigation recommendations
#[derive(Parser)]
#[command(name = "irriga")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the agents API
    #[arg(long, global = true, env = "IRRIGA_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate field data, push it to the backend and compare both engines
    Analyze(analyze::AnalyzeArgs),

    /// Login, registration and the stored session
    #[command(subcommand)]
    Auth(auth::AuthCommands),

    /// Rule module administration
    #[command(subcommand)]
    Admin(admin::AdminCommands),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let client = AgentsClient::with_timeout(&self.api_url, Duration::from_secs(self.timeout_secs));

        match self.command {
            Commands::Analyze(args) => analyze::execute(args, client).await,
            Commands::Auth(cmd) => auth::execute(cmd, &client).await,
            Commands::Admin(cmd) => admin::execute(cmd, &client).await,
        }
    }
}
