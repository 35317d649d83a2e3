//! Payloads pushed to the agents API before asking for recommendations.

use serde::{Deserialize, Serialize};

use super::{CropType, Goal, IrrigationSystem, PlantingMode, SensorType, Stage};

/// A single named measurement attached to a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub location: String,
    #[serde(rename = "type")]
    pub kind: SensorType,
    pub value: f64,
}

/// Planting mode and container size. `size` is zero in field mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldContext {
    pub location: String,
    pub mode: PlantingMode,
    pub size: f64,
}

impl FieldContext {
    /// Derive mode and size from the pot toggle.
    pub fn new(location: &str, is_pot: bool, pot_size: f64) -> Self {
        let (mode, size) = if is_pot {
            (PlantingMode::Pot, pot_size)
        } else {
            (PlantingMode::Field, 0.0)
        };
        Self {
            location: location.to_string(),
            mode,
            size,
        }
    }
}

/// Growth stage and week (1-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthStage {
    pub location: String,
    pub stage: Stage,
    pub week: u32,
}

/// Crop-specific tuning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedParams {
    pub location: String,
    /// Electrical conductivity; `null` when not applicable.
    pub ec: Option<f64>,
    pub system: IrrigationSystem,
    pub goal: Goal,
}

/// Query for the AI recommendation endpoint.
///
/// Optional parameters are left out of the query string entirely
/// instead of being sent empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AiQuery {
    pub crop: CropType,
    pub location: String,
    pub moisture: f64,
    pub temp: f64,
    pub humidity: f64,
    pub rain: f64,
    pub stage: Stage,
    pub week: u32,
    pub is_pot: bool,
    pub pot_size: Option<f64>,
    pub ec: Option<f64>,
    pub system: Option<IrrigationSystem>,
    pub goal: Option<Goal>,
}

impl AiQuery {
    /// Query string pairs, in a stable order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("crop", self.crop.to_string()),
            ("location", self.location.clone()),
            ("moisture", self.moisture.to_string()),
            ("temp", self.temp.to_string()),
            ("humidity", self.humidity.to_string()),
            ("rain", self.rain.to_string()),
            ("stage", self.stage.to_string()),
            ("week", self.week.to_string()),
            ("isPot", self.is_pot.to_string()),
        ];

        if self.is_pot {
            if let Some(size) = self.pot_size {
                pairs.push(("potSize", size.to_string()));
            }
        }
        if let Some(ec) = self.ec {
            pairs.push(("ec", ec.to_string()));
        }
        if let Some(system) = self.system {
            pairs.push(("system", system.to_string()));
        }
        if let Some(goal) = self.goal {
            pairs.push(("goal", goal.to_string()));
        }

        pairs
    }
}
