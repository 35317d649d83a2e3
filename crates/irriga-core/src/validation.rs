//! Input validation.
//!
//! Rules run in a fixed order and the first failure wins. Nothing here
//! touches the network.

use crate::constants::VALIDATION_RANGES;
use crate::error::ValidationError;
use crate::model::{AnalysisInput, FieldForm};

/// Parse a form field as a finite number.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validate the sensor readings and, for pots, the pot size.
pub fn validate_inputs(
    moisture: &str,
    rain: &str,
    temp: &str,
    humidity: &str,
    pot_size: &str,
    is_pot: bool,
) -> Result<(), ValidationError> {
    let ranges = VALIDATION_RANGES;

    if !parse_number(moisture).is_some_and(|v| ranges.moisture.contains(v)) {
        return Err(ValidationError::Moisture {
            min: ranges.moisture.min,
            max: ranges.moisture.max,
        });
    }
    if !parse_number(rain).is_some_and(|v| v >= ranges.rain_min) {
        return Err(ValidationError::Rain);
    }
    if !parse_number(temp).is_some_and(|v| ranges.temperature.contains(v)) {
        return Err(ValidationError::Temperature {
            min: ranges.temperature.min,
            max: ranges.temperature.max,
        });
    }
    if !parse_number(humidity).is_some_and(|v| ranges.humidity.contains(v)) {
        return Err(ValidationError::Humidity {
            min: ranges.humidity.min,
            max: ranges.humidity.max,
        });
    }
    if is_pot && !parse_number(pot_size).is_some_and(|v| v > ranges.pot_size_min) {
        return Err(ValidationError::PotSize);
    }

    Ok(())
}

/// Validate a whole form: sensor inputs first, then week and EC.
pub fn validate_form(form: &FieldForm) -> Result<AnalysisInput, ValidationError> {
    validate_inputs(
        &form.moisture,
        &form.rain,
        &form.temp,
        &form.humidity,
        &form.pot_size,
        form.is_pot,
    )?;

    let week_min = VALIDATION_RANGES.week_min;
    let week = form
        .week
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|w| *w >= week_min)
        .ok_or(ValidationError::Week { min: week_min })?;

    let ec = if form.ec.trim().is_empty() {
        None
    } else {
        let ec = parse_number(&form.ec)
            .filter(|v| *v >= VALIDATION_RANGES.ec_min)
            .ok_or(ValidationError::Ec)?;
        Some(ec)
    };

    // The checks above guarantee these parse.
    let number = |raw: &str| parse_number(raw).unwrap_or_default();

    Ok(AnalysisInput {
        location: form.location.trim().to_string(),
        crop: form.crop,
        moisture: number(&form.moisture),
        rain: number(&form.rain),
        temp: number(&form.temp),
        humidity: number(&form.humidity),
        is_pot: form.is_pot,
        pot_size: if form.is_pot { parse_number(&form.pot_size) } else { None },
        stage: form.stage,
        week,
        ec,
        system: form.system,
        goal: form.goal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn check(moisture: &str, rain: &str, temp: &str, humidity: &str) -> Result<(), ValidationError> {
        validate_inputs(moisture, rain, temp, humidity, "10", false)
    }

    #[test]
    fn test_valid_inputs() {
        assert_eq!(check("50", "0", "25", "60"), Ok(()));
        assert_eq!(check("0", "12.5", "-50", "100"), Ok(()));
        assert_eq!(check("100", "0", "60", "0"), Ok(()));
    }

    #[test]
    fn test_moisture_out_of_range_message() {
        let err = check("150", "0", "25", "60").unwrap_err();
        assert_eq!(err.to_string(), "Umidade do solo deve estar entre 0% e 100%");
    }

    #[test]
    fn test_non_numeric_moisture_is_rejected() {
        assert!(matches!(check("abc", "0", "25", "60"), Err(ValidationError::Moisture { .. })));
        assert!(matches!(check("", "0", "25", "60"), Err(ValidationError::Moisture { .. })));
        assert!(matches!(check("NaN", "0", "25", "60"), Err(ValidationError::Moisture { .. })));
    }

    #[test]
    fn test_negative_rain() {
        let err = check("50", "-1", "25", "60").unwrap_err();
        assert_eq!(err.to_string(), "Chuva não pode ser negativa");
    }

    #[test]
    fn test_temperature_message_names_bounds() {
        let err = check("50", "0", "61", "60").unwrap_err();
        assert_eq!(err.to_string(), "Temperatura deve estar entre -50°C e 60°C");
    }

    #[test]
    fn test_humidity_message() {
        let err = check("50", "0", "25", "101").unwrap_err();
        assert_eq!(err.to_string(), "Umidade do ar deve estar entre 0% e 100%");
    }

    #[test]
    fn test_first_failure_wins() {
        let err = check("-1", "-1", "99", "101").unwrap_err();
        assert!(matches!(err, ValidationError::Moisture { .. }));

        let err = check("50", "-1", "99", "101").unwrap_err();
        assert_eq!(err, ValidationError::Rain);
    }

    #[test]
    fn test_pot_size_only_checked_for_pots() {
        assert_eq!(validate_inputs("50", "0", "25", "60", "0", false), Ok(()));
        assert_eq!(
            validate_inputs("50", "0", "25", "60", "0", true),
            Err(ValidationError::PotSize)
        );
        assert_eq!(
            validate_inputs("50", "0", "25", "60", "", true),
            Err(ValidationError::PotSize)
        );
    }

    #[test]
    fn test_form_week_and_ec() {
        let form = FieldForm {
            week: "0".to_string(),
            ..FieldForm::default()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::Week { min: 1 });

        let form = FieldForm {
            week: "x".to_string(),
            ..FieldForm::default()
        };
        assert!(matches!(form.validate(), Err(ValidationError::Week { .. })));

        let form = FieldForm {
            ec: "-0.5".to_string(),
            ..FieldForm::default()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::Ec);
    }

    #[test]
    fn test_sensor_rules_run_before_week() {
        let form = FieldForm {
            moisture: "150".to_string(),
            week: "0".to_string(),
            ..FieldForm::default()
        };
        assert!(matches!(form.validate(), Err(ValidationError::Moisture { .. })));
    }

    proptest! {
        #[test]
        fn prop_moisture_outside_range_rejected(v in prop_oneof![-1.0e6f64..-0.0001, 100.0001f64..1.0e6]) {
            prop_assert!(check(&v.to_string(), "0", "25", "60").is_err());
        }

        #[test]
        fn prop_valid_inputs_accepted(
            moisture in 0.0f64..=100.0,
            rain in 0.0f64..500.0,
            temp in -50.0f64..=60.0,
            humidity in 0.0f64..=100.0,
            pot in 0.001f64..1000.0,
        ) {
            prop_assert_eq!(
                validate_inputs(
                    &moisture.to_string(),
                    &rain.to_string(),
                    &temp.to_string(),
                    &humidity.to_string(),
                    &pot.to_string(),
                    true,
                ),
                Ok(())
            );
        }

        #[test]
        fn prop_non_positive_pot_always_rejected(pot in -1.0e6f64..=0.0) {
            prop_assert_eq!(
                validate_inputs("50", "0", "25", "60", &pot.to_string(), true),
                Err(ValidationError::PotSize)
            );
        }
    }
}
