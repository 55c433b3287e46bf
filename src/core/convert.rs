//! Conversion dispatcher: routes a value to the speed table or the
//! dimensional table depending on its category.
use crate::core::error::ConversionError;
use crate::core::{measure, units};
use tracing::debug;

pub const SPEED_CATEGORY: &str = "speed";

/// Multipliers from a speed unit to meters per second.
const TO_METERS_PER_SECOND: &[(&str, f64)] = &[
    ("meters per second", 1.0),
    ("kilometers per hour", 1.0 / 3.6),
    ("miles per hour", 0.44704),
    ("feet per second", 0.3048),
    ("knots", 0.514444),
];

/// Multipliers from meters per second to a speed unit.
const FROM_METERS_PER_SECOND: &[(&str, f64)] = &[
    ("meters per second", 1.0),
    ("kilometers per hour", 3.6),
    ("miles per hour", 2.23694),
    ("feet per second", 3.28084),
    ("knots", 1.94384),
];

fn lookup(table: &[(&str, f64)], unit: &str) -> Option<f64> {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(unit))
        .map(|(_, multiplier)| *multiplier)
}

pub fn convert_speed(value: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
    match (
        lookup(TO_METERS_PER_SECOND, from),
        lookup(FROM_METERS_PER_SECOND, to),
    ) {
        (Some(to_mps), Some(from_mps)) => Ok(value * to_mps * from_mps),
        _ => Err(ConversionError::NotConvertible {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

/// Converts `value` from one unit to another within `category`.
///
/// Zero converts to zero for every convertible unit pair, temperature
/// included.
pub fn convert(value: f64, from: &str, to: &str, category: &str) -> Result<f64, ConversionError> {
    if units::find_category(category).is_none() {
        return Err(ConversionError::UnknownCategory(category.to_string()));
    }
    debug!(value, from, to, category, "Converting");

    let converted = if category.eq_ignore_ascii_case(SPEED_CATEGORY) {
        convert_speed(value, from, to)?
    } else {
        measure::convert(value, from, to)?
    };

    // Only once both units are known to be convertible
    if value == 0.0 {
        return Ok(0.0);
    }
    Ok(converted)
}

/// A single pending conversion, as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub value: f64,
    pub from: String,
    pub to: String,
    pub category: String,
}

impl ConversionRequest {
    pub fn swapped(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            ..self
        }
    }

    pub fn run(&self) -> Result<f64, ConversionError> {
        convert(self.value, &self.from, &self.to, &self.category)
    }
}

/// Parses user input. Empty text means "nothing to convert yet".
///
/// Accepts digits with at most one decimal point and, when `allow_negative`
/// is set, a single leading minus sign.
pub fn parse_input(text: &str, allow_negative: bool) -> Result<Option<f64>, ConversionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let invalid = || ConversionError::InvalidInput(trimmed.to_string());
    let unsigned = match trimmed.strip_prefix('-') {
        Some(rest) if allow_negative => rest,
        Some(_) => return Err(invalid()),
        None => trimmed,
    };

    let mut seen_dot = false;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => return Err(invalid()),
        }
    }

    // "-", "." and "-." are valid while typing but carry no number
    if !unsigned.chars().any(|c| c.is_ascii_digit()) {
        return Ok(None);
    }

    trimmed.parse::<f64>().map(Some).map_err(|_| invalid())
}

/// Formats a converted value for display.
pub fn format_result(value: f64) -> String {
    if (value > 0.0 && value < 0.001) || value > 1_000_000.0 {
        let formatted = format!("{value:.3e}");
        // Positive exponents carry an explicit sign, as in 2.500e+6
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    let fixed = format!("{value:.6}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
