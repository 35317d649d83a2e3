//! Analyze command - one full analysis cycle for a field.

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use serde_json::{json, Value};

use irriga_client::AgentsClient;
use irriga_core::analysis::AnalysisSnapshot;
use irriga_core::model::{CropType, FieldForm, Goal, IrrigationSystem, Stage};
use irriga_core::{AnalysisOutcome, Analyzer, ErrorContext, FailureStage};

use crate::output;
use crate::progress::AnalysisProgress;

/// Field inputs. Anything left out keeps the form default.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Field or pot identifier
    #[arg(long, short)]
    pub location: Option<String>,

    /// Crop (corn, tomato, wheat, lettuce, cannabis)
    #[arg(long, short)]
    pub crop: Option<CropType>,

    /// Soil moisture, %
    #[arg(long, short, allow_hyphen_values = true)]
    pub moisture: Option<String>,

    /// Rain in the last 24h, mm
    #[arg(long, allow_hyphen_values = true)]
    pub rain: Option<String>,

    /// Air temperature, °C
    #[arg(long, short, allow_hyphen_values = true)]
    pub temp: Option<String>,

    /// Relative humidity, %
    #[arg(long, allow_hyphen_values = true)]
    pub humidity: Option<String>,

    /// Planted in a pot instead of the field
    #[arg(long)]
    pub pot: bool,

    /// Pot size, liters
    #[arg(long, allow_hyphen_values = true)]
    pub pot_size: Option<String>,

    /// Growth stage (seedling, vegetative, blooming)
    #[arg(long, short)]
    pub stage: Option<Stage>,

    /// Week within the stage
    #[arg(long, short, allow_hyphen_values = true)]
    pub week: Option<String>,

    /// Electrical conductivity; pass an empty value when not applicable
    #[arg(long, allow_hyphen_values = true)]
    pub ec: Option<String>,

    /// Irrigation system (drip, pivot, furrow)
    #[arg(long)]
    pub system: Option<IrrigationSystem>,

    /// Cultivation goal (balanced, vegetative, generative)
    #[arg(long, short)]
    pub goal: Option<Goal>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeArgs {
    /// Overlay the given flags on the default form.
    pub fn to_form(&self) -> FieldForm {
        let mut form = FieldForm::default();
        if let Some(v) = &self.location {
            form.location = v.clone();
        }
        if let Some(v) = self.crop {
            form.crop = v;
        }
        if let Some(v) = &self.moisture {
            form.moisture = v.clone();
        }
        if let Some(v) = &self.rain {
            form.rain = v.clone();
        }
        if let Some(v) = &self.temp {
            form.temp = v.clone();
        }
        if let Some(v) = &self.humidity {
            form.humidity = v.clone();
        }
        form.is_pot = self.pot;
        if let Some(v) = &self.pot_size {
            form.pot_size = v.clone();
        }
        if let Some(v) = self.stage {
            form.stage = v;
        }
        if let Some(v) = &self.week {
            form.week = v.clone();
        }
        if let Some(v) = &self.ec {
            form.ec = v.clone();
        }
        if let Some(v) = self.system {
            form.system = v;
        }
        if let Some(v) = self.goal {
            form.goal = v;
        }
        form
    }
}

pub async fn execute(args: AnalyzeArgs, client: AgentsClient) -> Result<()> {
    let form = args.to_form();
    let analyzer = Analyzer::new(Arc::new(client));

    if args.json {
        let outcome = analyzer.analyze(&form).await;
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
        return exit_status(&outcome);
    }

    println!(
        "{} Analisando {} ({})\n",
        "→".blue().bold(),
        form.location.cyan(),
        form.crop.display_name()
    );

    let outcome = run_with_progress(&analyzer, &form).await;
    let snap = analyzer.snapshot();
    render(&snap, form.is_pot);
    exit_status(&outcome)
}

/// Run the cycle while spinners follow the published snapshots.
async fn run_with_progress(analyzer: &Analyzer, form: &FieldForm) -> AnalysisOutcome {
    let progress = AnalysisProgress::new();
    let mut rx = analyzer.subscribe();

    let analysis = analyzer.analyze(form);
    tokio::pin!(analysis);

    let outcome = loop {
        tokio::select! {
            outcome = &mut analysis => break outcome,
            changed = rx.changed() => {
                if changed.is_err() {
                    break (&mut analysis).await;
                }
                progress.update(&rx.borrow_and_update());
            }
        }
    };

    progress.finish(&analyzer.snapshot());
    outcome
}

fn render(snap: &AnalysisSnapshot, is_pot: bool) {
    println!();
    if let Some(rec) = &snap.recommendation {
        output::print_prolog(rec, is_pot);
        println!();
    }
    if let Some(rec) = &snap.ai_recommendation {
        output::print_ai(rec, is_pot);
        println!();
    }

    output::print_api_status(snap.api_status);

    // The error notification becomes the command error.
    if let Some(notification) = &snap.success {
        output::print_success(&notification.message);
    }
}

fn exit_status(outcome: &AnalysisOutcome) -> Result<()> {
    match outcome {
        AnalysisOutcome::Success { .. } => Ok(()),
        AnalysisOutcome::Invalid(err) => bail!("{}", err),
        AnalysisOutcome::Failure { error, .. } => bail!("{}", error.user_message),
        AnalysisOutcome::Busy => bail!("Uma análise já está em andamento"),
    }
}

fn error_json(error: &ErrorContext) -> Value {
    serde_json::to_value(error).unwrap_or(Value::Null)
}

/// Machine readable form of an outcome.
pub fn outcome_json(outcome: &AnalysisOutcome) -> Value {
    match outcome {
        AnalysisOutcome::Success { prolog, ai } => json!({
            "status": "success",
            "recommendation": prolog,
            "aiRecommendation": ai,
        }),
        AnalysisOutcome::Failure { error, stage, prolog, ai } => json!({
            "status": "failure",
            "stage": match stage {
                FailureStage::Update => "update",
                FailureStage::Fetch => "fetch",
            },
            "error": error_json(error),
            "recommendation": prolog,
            "aiRecommendation": ai,
        }),
        AnalysisOutcome::Invalid(err) => json!({
            "status": "invalid",
            "error": error_json(&ErrorContext::from(err)),
        }),
        AnalysisOutcome::Busy => json!({ "status": "busy" }),
    }
}
