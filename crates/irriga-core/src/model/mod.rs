//! Domain models.
//!
//! All values here are request-scoped: built from the current form,
//! sent to the agents API, or received from it.

pub mod field;
pub mod form;
pub mod recommendation;

pub use field::{AdvancedParams, AiQuery, FieldContext, GrowthStage, SensorReading};
pub use form::{AnalysisInput, FieldForm};
pub use recommendation::{AiRecommendation, PrologRecommendation, ScoreBand, Volume};

use thiserror::Error;

/// A string that does not name any variant of a closed set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("valor inválido para {kind}: '{value}' (esperado: {expected})")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Declare a closed set of values with a fixed wire name per variant.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::model::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($wire => Ok($name::$variant),)+
                    other => Err($crate::model::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                        expected: [$($wire),+].join(", "),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Crop being irrigated.
    CropType {
        Corn => "corn",
        Tomato => "tomato",
        Wheat => "wheat",
        Lettuce => "lettuce",
        Cannabis => "cannabis",
    }
}

wire_enum! {
    /// Measurement carried by a sensor reading.
    SensorType {
        SoilMoisturePct => "soil_moisture_pct",
        RainLast24hMm => "rain_last_24h_mm",
        AirTemperatureC => "air_temperature_c",
        RelativeHumidityPct => "relative_humidity_pct",
    }
}

wire_enum! {
    /// Planting mode.
    PlantingMode {
        Pot => "pot",
        Field => "field",
    }
}

wire_enum! {
    /// Growth stage of the crop.
    Stage {
        Seedling => "seedling",
        Vegetative => "vegetative",
        Blooming => "blooming",
    }
}

wire_enum! {
    /// Irrigation system in use.
    IrrigationSystem {
        Drip => "drip",
        Pivot => "pivot",
        Furrow => "furrow",
    }
}

wire_enum! {
    /// Cultivation goal.
    Goal {
        Balanced => "balanced",
        Vegetative => "vegetative",
        Generative => "generative",
    }
}

wire_enum! {
    /// Irrigation need reported by the rule engine.
    Need {
        Yes => "yes",
        No => "no",
        Maybe => "maybe",
    }
}

impl CropType {
    /// Portuguese display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Corn => "Milho",
            Self::Tomato => "Tomate",
            Self::Wheat => "Trigo",
            Self::Lettuce => "Alface",
            Self::Cannabis => "Cannabis",
        }
    }
}

impl Need {
    /// Label shown for the rule engine verdict.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "SIM",
            Self::Maybe => "TALVEZ",
            Self::No => "NÃO",
        }
    }
}
