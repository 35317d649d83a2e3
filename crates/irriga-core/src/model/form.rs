//! Form state and the typed input derived from it.

use serde::{Deserialize, Serialize};

use super::field::{AdvancedParams, AiQuery, FieldContext, GrowthStage, SensorReading};
use super::{CropType, Goal, IrrigationSystem, SensorType, Stage};
use crate::error::ValidationError;
use crate::validation;

/// Raw form inputs, kept as typed text until validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldForm {
    pub location: String,
    pub crop: CropType,
    pub moisture: String,
    pub rain: String,
    pub temp: String,
    pub humidity: String,
    pub is_pot: bool,
    pub pot_size: String,
    pub stage: Stage,
    pub week: String,
    /// Empty when not applicable to the crop.
    pub ec: String,
    pub system: IrrigationSystem,
    pub goal: Goal,
}

impl Default for FieldForm {
    fn default() -> Self {
        Self {
            location: "field1".to_string(),
            crop: CropType::Corn,
            moisture: "50".to_string(),
            rain: "0".to_string(),
            temp: "25".to_string(),
            humidity: "60".to_string(),
            is_pot: false,
            pot_size: "10".to_string(),
            stage: Stage::Vegetative,
            week: "1".to_string(),
            ec: "1.5".to_string(),
            system: IrrigationSystem::Drip,
            goal: Goal::Balanced,
        }
    }
}

impl FieldForm {
    /// Validate every input and produce typed values.
    pub fn validate(&self) -> Result<AnalysisInput, ValidationError> {
        validation::validate_form(self)
    }
}

/// Validated, numeric form of [`FieldForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    pub location: String,
    pub crop: CropType,
    pub moisture: f64,
    pub rain: f64,
    pub temp: f64,
    pub humidity: f64,
    pub is_pot: bool,
    /// Only meaningful when `is_pot` is set.
    pub pot_size: Option<f64>,
    pub stage: Stage,
    pub week: u32,
    pub ec: Option<f64>,
    pub system: IrrigationSystem,
    pub goal: Goal,
}

impl AnalysisInput {
    /// One reading per sensor type.
    pub fn sensor_readings(&self) -> Vec<SensorReading> {
        SensorType::ALL
            .iter()
            .map(|kind| SensorReading {
                location: self.location.clone(),
                kind: *kind,
                value: match kind {
                    SensorType::SoilMoisturePct => self.moisture,
                    SensorType::RainLast24hMm => self.rain,
                    SensorType::AirTemperatureC => self.temp,
                    SensorType::RelativeHumidityPct => self.humidity,
                },
            })
            .collect()
    }

    pub fn field_context(&self) -> FieldContext {
        FieldContext::new(&self.location, self.is_pot, self.pot_size.unwrap_or(0.0))
    }

    pub fn growth_stage(&self) -> GrowthStage {
        GrowthStage {
            location: self.location.clone(),
            stage: self.stage,
            week: self.week,
        }
    }

    pub fn advanced_params(&self) -> AdvancedParams {
        AdvancedParams {
            location: self.location.clone(),
            ec: self.ec,
            system: self.system,
            goal: self.goal,
        }
    }

    pub fn ai_query(&self) -> AiQuery {
        AiQuery {
            crop: self.crop,
            location: self.location.clone(),
            moisture: self.moisture,
            temp: self.temp,
            humidity: self.humidity,
            rain: self.rain,
            stage: self.stage,
            week: self.week,
            is_pot: self.is_pot,
            pot_size: self.pot_size.filter(|_| self.is_pot),
            ec: self.ec,
            system: Some(self.system),
            goal: Some(self.goal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlantingMode;

    #[test]
    fn test_default_form_is_valid() {
        let input = FieldForm::default().validate().unwrap();
        assert_eq!(input.location, "field1");
        assert_eq!(input.week, 1);
        assert_eq!(input.ec, Some(1.5));
        assert_eq!(input.pot_size, None);
    }

    #[test]
    fn test_sensor_readings_cover_every_type() {
        let input = FieldForm::default().validate().unwrap();
        let readings = input.sensor_readings();
        assert_eq!(readings.len(), 4);
        let moisture = readings
            .iter()
            .find(|r| r.kind == SensorType::SoilMoisturePct)
            .unwrap();
        assert_eq!(moisture.value, 50.0);
    }

    #[test]
    fn test_pot_form_derives_pot_context() {
        let form = FieldForm {
            is_pot: true,
            pot_size: "12.5".to_string(),
            ..FieldForm::default()
        };
        let input = form.validate().unwrap();
        let ctx = input.field_context();
        assert_eq!(ctx.mode, PlantingMode::Pot);
        assert_eq!(ctx.size, 12.5);
        assert_eq!(input.ai_query().pot_size, Some(12.5));
    }

    #[test]
    fn test_empty_ec_is_not_applicable() {
        let form = FieldForm {
            ec: "  ".to_string(),
            ..FieldForm::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.advanced_params().ec, None);
        assert!(input.ai_query().to_pairs().iter().all(|(k, _)| *k != "ec"));
    }
}
