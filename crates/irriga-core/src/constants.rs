//! Shared constants: validation bounds, notification timeouts and defaults.

use std::time::Duration;

/// Default API base URL when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Closed numeric interval used by the input validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check whether a value lies inside the interval (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Validation ranges for form inputs.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRanges {
    /// Soil moisture, percent.
    pub moisture: Bounds,
    /// Rain in the last 24h, mm. Lower bound only.
    pub rain_min: f64,
    /// Air temperature, °C.
    pub temperature: Bounds,
    /// Relative humidity, percent.
    pub humidity: Bounds,
    /// Pot size must be strictly greater than this.
    pub pot_size_min: f64,
    /// First valid growth week.
    pub week_min: u32,
    /// Electrical conductivity lower bound.
    pub ec_min: f64,
}

pub const VALIDATION_RANGES: ValidationRanges = ValidationRanges {
    moisture: Bounds::new(0.0, 100.0),
    rain_min: 0.0,
    temperature: Bounds::new(-50.0, 60.0),
    humidity: Bounds::new(0.0, 100.0),
    pot_size_min: 0.0,
    week_min: 1,
    ec_min: 0.0,
};

/// How long each kind of notification stays visible.
#[derive(Debug, Clone, Copy)]
pub struct NotificationTimeouts {
    pub error: Duration,
    pub success: Duration,
    pub validation_error: Duration,
}

pub const NOTIFICATION_TIMEOUTS: NotificationTimeouts = NotificationTimeouts {
    error: Duration::from_millis(8000),
    success: Duration::from_millis(5000),
    validation_error: Duration::from_millis(5000),
};

/// Message shown when an analysis cycle completes.
pub const SUCCESS_MESSAGE: &str = "Análise concluída com sucesso!";
