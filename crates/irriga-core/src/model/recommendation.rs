//! Recommendations returned by the rule engine and the AI engine.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::Need;

/// Irrigation volume in liters, or free text when the engine
/// cannot give a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Volume {
    Liters(f64),
    Text(String),
}

impl Volume {
    /// Human readable volume.
    ///
    /// Under one liter the value is shown in milliliters; otherwise in
    /// liters with at most three decimals. Field volumes are per m².
    pub fn display(&self, is_pot: bool) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Liters(v) if *v < 1.0 => {
                let unit = if is_pot { "mL" } else { "mL/m²" };
                format!("{} {}", (v * 1000.0).round() as i64, unit)
            }
            Self::Liters(v) => {
                let unit = if is_pot { "Litros" } else { "L/m²" };
                format!("{} {}", (v * 1000.0).round() / 1000.0, unit)
            }
        }
    }
}

/// Verdict of the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrologRecommendation {
    #[serde(rename = "Need")]
    pub need: Need,
    /// Confidence score, 0 to 100.
    #[serde(rename = "Score", deserialize_with = "lenient_score")]
    pub score: u8,
    #[serde(rename = "VolumeL")]
    pub volume_l: Volume,
    #[serde(rename = "Advice", default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

impl PrologRecommendation {
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

/// Accept any finite number, rounded and clamped to 0..=100.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(D::Error::custom("score is not a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// Verdict of the AI engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecommendation {
    /// "SIM" when irrigation is advised.
    pub should_irrigate: String,
    pub volume_l: Volume,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    /// Set when the backend served a cached answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl AiRecommendation {
    pub fn irrigate(&self) -> bool {
        self.should_irrigate.trim().eq_ignore_ascii_case("SIM")
    }
}

/// Coarse band used to color the rule engine score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s > 60 => Self::High,
            s if s > 30 => Self::Medium,
            _ => Self::Low,
        }
    }
}
