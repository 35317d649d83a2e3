//! Auth commands - login, registration and the stored session.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use dialoguer::{Input, Password};

use irriga_client::AgentsClient;
use irriga_core::credentials::{
    password_strength, validate_credentials, Credentials, StrengthLabel,
};
use irriga_core::ApiError;

use crate::output;
use crate::session::{self, StoredSession};

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in and store the session
    Login(LoginArgs),

    /// Create an account
    Register(RegisterArgs),

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Whoami,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Account email (prompted when missing)
    #[arg(long, short)]
    pub email: Option<String>,

    /// Password (prompted when missing)
    #[arg(long, env = "IRRIGA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Full name (prompted when missing)
    #[arg(long, short)]
    pub name: Option<String>,

    /// Account email (prompted when missing)
    #[arg(long, short)]
    pub email: Option<String>,

    /// Password (prompted when missing)
    #[arg(long, env = "IRRIGA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub async fn execute(cmd: AuthCommands, client: &AgentsClient) -> Result<()> {
    match cmd {
        AuthCommands::Login(args) => cmd_login(client, args).await,
        AuthCommands::Register(args) => cmd_register(client, args).await,
        AuthCommands::Logout => cmd_logout(),
        AuthCommands::Whoami => cmd_whoami(),
    }
}

async fn cmd_login(client: &AgentsClient, args: LoginArgs) -> Result<()> {
    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::new().with_prompt("Senha").interact()?,
    };

    let credentials = Credentials {
        email,
        password,
        name: None,
    };
    check(&credentials, false)?;

    let auth = client.login(&credentials).await.map_err(auth_failure)?;
    let stored = StoredSession::new(client.base_url(), auth);
    let path = session::save(&stored)?;

    let who = stored
        .user
        .as_ref()
        .map(|u| if u.name.is_empty() { u.email.clone() } else { u.name.clone() })
        .unwrap_or(credentials.email);
    output::print_success(&format!("Logado como {}", who.cyan()));
    println!("  {}", format!("session: {}", path.display()).dimmed());

    Ok(())
}

async fn cmd_register(client: &AgentsClient, args: RegisterArgs) -> Result<()> {
    let name = match args.name {
        Some(name) => name,
        None => Input::<String>::new().with_prompt("Nome").interact_text()?,
    };
    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Senha")
            .with_confirmation("Confirme a senha", "As senhas não coincidem")
            .interact()?,
    };

    if let Some(strength) = password_strength(&password) {
        let label = match strength.label {
            StrengthLabel::Fraca => strength.label.as_str().red(),
            StrengthLabel::Media => strength.label.as_str().yellow(),
            StrengthLabel::Forte => strength.label.as_str().green(),
        };
        println!("  Força da senha: {} ({}%)", label, strength.percent());
    }

    let credentials = Credentials {
        email,
        password,
        name: Some(name),
    };
    check(&credentials, true)?;

    client.register(&credentials).await.map_err(auth_failure)?;
    output::print_success("Registro realizado com sucesso! Faça login para continuar.");

    Ok(())
}

fn cmd_logout() -> Result<()> {
    if session::clear()? {
        output::print_success("Sessão encerrada");
    } else {
        println!("{}", "No stored session.".dimmed());
    }
    Ok(())
}

fn cmd_whoami() -> Result<()> {
    let Some(stored) = session::load()? else {
        println!("{}", "Not logged in.".dimmed());
        return Ok(());
    };

    match &stored.user {
        Some(user) => {
            println!("{} <{}>", user.name.cyan().bold(), user.email);
            if let Some(role) = &user.role {
                println!("{}: {}", "Role".bold(), role);
            }
        }
        None => println!("{}", "(usuário desconhecido)".dimmed()),
    }
    println!("{}: {}", "API".bold(), stored.api_url);
    println!(
        "{}: {}",
        "Since".bold(),
        stored.logged_in_at.format("%Y-%m-%d %H:%M UTC")
    );

    Ok(())
}

/// Local checks before anything is sent.
fn check(credentials: &Credentials, register: bool) -> Result<()> {
    if let Err(errors) = validate_credentials(credentials, register) {
        for err in &errors {
            output::print_failure(&err.to_string());
        }
        bail!("Dados de acesso inválidos");
    }
    Ok(())
}

/// Auth failures show the server message; transport problems are classified.
fn auth_failure(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Http { message, .. } => anyhow::anyhow!(message),
        other => output::api_failure(&other),
    }
}
