//! Live spinners for the two engines, driven by analysis snapshots.

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use irriga_core::analysis::{AnalysisPhase, AnalysisSnapshot};

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// One spinner per engine.
pub struct AnalysisProgress {
    _multi: MultiProgress,
    prolog: ProgressBar,
    ai: ProgressBar,
}

impl AnalysisProgress {
    pub fn new() -> Self {
        let multi = MultiProgress::new();
        let prolog = multi.add(create_spinner("Prolog: aguardando..."));
        let ai = multi.add(create_spinner("IA: aguardando..."));
        Self {
            _multi: multi,
            prolog,
            ai,
        }
    }

    pub fn update(&self, snap: &AnalysisSnapshot) {
        if snap.phase == AnalysisPhase::Fetching || snap.phase.is_settled() {
            engine(&self.prolog, "Prolog", snap.prolog_loading, snap.recommendation.is_some());
            engine(&self.ai, "IA", snap.ai_loading, snap.ai_recommendation.is_some());
        } else if snap.phase.is_in_flight() {
            let step = if snap.phase == AnalysisPhase::Validating {
                "validando dados..."
            } else {
                "enviando dados do campo..."
            };
            self.prolog.set_message(format!("Prolog: {}", step));
            self.ai.set_message(format!("IA: {}", step));
        }
    }

    /// Stop both spinners with their final state.
    pub fn finish(&self, snap: &AnalysisSnapshot) {
        settle(&self.prolog, "Prolog", snap.recommendation.is_some());
        settle(&self.ai, "IA", snap.ai_recommendation.is_some());
    }
}

fn engine(bar: &ProgressBar, label: &str, loading: bool, has_result: bool) {
    if bar.is_finished() {
        return;
    }
    if loading {
        bar.set_message(format!("{}: consultando...", label));
    } else if has_result {
        bar.finish_with_message(format!("{}: pronto", label));
    }
}

fn settle(bar: &ProgressBar, label: &str, has_result: bool) {
    if bar.is_finished() {
        return;
    }
    if has_result {
        bar.finish_with_message(format!("{}: pronto", label));
    } else {
        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            bar.set_style(style);
        }
        bar.abandon_with_message(format!("✗ {}: sem resposta", label));
    }
}
