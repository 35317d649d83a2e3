//! Terminal output formatting.

use anyhow::anyhow;
use colored::{ColoredString, Colorize};
use tracing::error;

use irriga_core::analysis::ApiStatus;
use irriga_core::model::{AiRecommendation, Need, PrologRecommendation, ScoreBand};
use irriga_core::{classify, ApiError};

/// Print the rule engine verdict.
pub fn print_prolog(rec: &PrologRecommendation, is_pot: bool) {
    println!("{}", "Motor de Regras (Prolog)".cyan().bold());
    println!("  {}: {}", "Irrigar".bold(), need_colored(rec.need));
    println!("  {}: {}", "Confiança".bold(), score_colored(rec.score));
    println!("  {}: {}", "Volume".bold(), rec.volume_l.display(is_pot));
    if let Some(advice) = &rec.advice {
        println!("  {}", advice.dimmed());
    }
}

/// Print the AI engine verdict.
pub fn print_ai(rec: &AiRecommendation, is_pot: bool) {
    let cached = if rec.cached == Some(true) {
        " (cache)".dimmed().to_string()
    } else {
        String::new()
    };
    println!("{}{}", "Inteligência Artificial".magenta().bold(), cached);

    let verdict = if rec.irrigate() { "SIM".green().bold() } else { "NÃO".red().bold() };
    println!("  {}: {}", "Irrigar".bold(), verdict);
    println!("  {}: {}", "Volume".bold(), rec.volume_l.display(is_pot));
    if let Some(advice) = &rec.advice {
        println!("  {}", advice.dimmed());
    }
}

pub fn print_api_status(status: ApiStatus) {
    let Some(label) = status.label() else {
        return;
    };
    let colored = match status {
        ApiStatus::Online => label.green(),
        ApiStatus::Offline => label.red(),
        _ => label.yellow(),
    };
    println!("{} {}", "●".dimmed(), colored);
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_failure(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

fn need_colored(need: Need) -> ColoredString {
    match need {
        Need::Yes => need.label().green().bold(),
        Need::Maybe => need.label().yellow().bold(),
        Need::No => need.label().red().bold(),
    }
}

fn score_colored(score: u8) -> ColoredString {
    let text = format!("{}%", score);
    match ScoreBand::from_score(score) {
        ScoreBand::High => text.green(),
        ScoreBand::Medium => text.yellow(),
        ScoreBand::Low => text.red(),
    }
}

/// Classify an API failure into the error shown to the user. The
/// diagnostic side is logged only.
pub fn api_failure(err: &ApiError) -> anyhow::Error {
    let ctx = classify(err);
    error!(
        kind = %ctx.kind,
        status = ?err.status(),
        message = %ctx.message,
        details = ?err.details(),
        "Request failed"
    );
    anyhow!(ctx.user_message)
}
