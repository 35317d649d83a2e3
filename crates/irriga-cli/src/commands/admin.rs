//! Admin commands - inspect and replace rule modules.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use irriga_client::{module_display_name, AgentsClient};
use irriga_core::ApiError;

use crate::output;
use crate::session;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List rule modules
    Modules,

    /// Print the source of a rule module
    Show {
        /// Module path, e.g. crops/corn.pl
        path: String,
    },

    /// Replace a rule module with the contents of a file
    Save {
        /// Module path, e.g. crops/corn.pl
        path: String,

        /// File holding the new source
        #[arg(long, short)]
        file: PathBuf,
    },
}

pub async fn execute(cmd: AdminCommands, client: &AgentsClient) -> Result<()> {
    let token = session::require_token()?;

    match cmd {
        AdminCommands::Modules => cmd_modules(client, &token).await,
        AdminCommands::Show { path } => cmd_show(client, &token, &path).await,
        AdminCommands::Save { path, file } => cmd_save(client, &token, &path, &file).await,
    }
}

async fn cmd_modules(client: &AgentsClient, token: &str) -> Result<()> {
    let modules = client
        .list_modules(token)
        .await
        .map_err(|e| output::api_failure(&e).context("Falha ao carregar lista de módulos"))?;

    if modules.is_empty() {
        println!("{}", "No modules found.".dimmed());
        return Ok(());
    }

    println!("{:<36} {}", "Module", "Path");
    println!("{}", "─".repeat(70));
    for path in &modules {
        println!("{:<36} {}", module_display_name(path).cyan(), path.dimmed());
    }

    Ok(())
}

async fn cmd_show(client: &AgentsClient, token: &str, path: &str) -> Result<()> {
    let content = client
        .get_module(token, path)
        .await
        .map_err(|e| output::api_failure(&e).context("Falha ao carregar módulo"))?;

    println!("{}", format!("% {} ({})", module_display_name(path), path).dimmed());
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }

    Ok(())
}

async fn cmd_save(client: &AgentsClient, token: &str, path: &str, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("{}", "Salvando e validando...".dimmed());

    let report = client
        .save_module(token, path, &content)
        .await
        .map_err(save_failure)?;

    output::print_success("Módulo atualizado e validado com sucesso!");
    if let Some(message) = report.message {
        println!("  {}", message.dimmed());
    }

    Ok(())
}

/// A rejected module shows the validator output; anything else is classified.
fn save_failure(err: ApiError) -> anyhow::Error {
    match &err {
        ApiError::Http { message, details, .. } => {
            let mut text = format!("Erro: {}", message);
            for detail in details {
                text.push_str(&format!("\n  {}", detail));
            }
            anyhow::anyhow!(text)
        }
        _ => output::api_failure(&err),
    }
}
