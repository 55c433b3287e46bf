//! Dimensional conversion table for every category except speed.
//!
//! Each unit is expressed as an affine map onto its dimension's reference
//! unit: `reference = (value + offset) * factor`.
use crate::core::error::ConversionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Length,
    Mass,
    Temperature,
    Volume,
    Area,
    Energy,
    Pressure,
    Power,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub dimension: Dimension,
    pub factor: f64,
    pub offset: f64,
}

impl Scale {
    const fn linear(dimension: Dimension, factor: f64) -> Self {
        Scale {
            dimension,
            factor,
            offset: 0.0,
        }
    }

    fn to_reference(self, value: f64) -> f64 {
        (value + self.offset) * self.factor
    }

    fn from_reference(self, value: f64) -> f64 {
        value / self.factor - self.offset
    }
}

/// Returns the scale of a unit key, `None` for units this table doesn't know.
pub fn scale_of(unit: &str) -> Option<Scale> {
    use Dimension::*;

    let scale = match unit.to_lowercase().as_str() {
        // meters
        "meters" => Scale::linear(Length, 1.0),
        "kilometers" => Scale::linear(Length, 1_000.0),
        "centimeters" => Scale::linear(Length, 0.01),
        "millimeters" => Scale::linear(Length, 0.001),
        "inches" => Scale::linear(Length, 0.0254),
        "feet" => Scale::linear(Length, 0.3048),
        "yards" => Scale::linear(Length, 0.9144),
        "miles" => Scale::linear(Length, 1_609.344),

        // kilograms
        "grams" => Scale::linear(Mass, 0.001),
        "kilograms" => Scale::linear(Mass, 1.0),
        "pounds" => Scale::linear(Mass, 0.453_592_37),
        "ounces" => Scale::linear(Mass, 0.028_349_523_125),
        "tonnes" => Scale::linear(Mass, 1_000.0),
        "stone" => Scale::linear(Mass, 6.350_293_18),

        // kelvin
        "kelvin" => Scale::linear(Temperature, 1.0),
        "celsius" => Scale {
            dimension: Temperature,
            factor: 1.0,
            offset: 273.15,
        },
        "fahrenheit" => Scale {
            dimension: Temperature,
            factor: 5.0 / 9.0,
            offset: 459.67,
        },

        // cubic meters, US liquid measures
        "cubic meters" => Scale::linear(Volume, 1.0),
        "liters" => Scale::linear(Volume, 0.001),
        "milliliters" => Scale::linear(Volume, 1e-6),
        "gallons" => Scale::linear(Volume, 0.003_785_411_784),
        "quarts" => Scale::linear(Volume, 0.000_946_352_946),
        "pints" => Scale::linear(Volume, 0.000_473_176_473),
        "cups" => Scale::linear(Volume, 0.000_236_588_236_5),
        "cubic feet" => Scale::linear(Volume, 0.028_316_846_592),

        // square meters
        "square meters" => Scale::linear(Area, 1.0),
        "square kilometers" => Scale::linear(Area, 1e6),
        "square centimeters" => Scale::linear(Area, 1e-4),
        "square feet" => Scale::linear(Area, 0.092_903_04),
        "square inches" => Scale::linear(Area, 0.000_645_16),
        "acres" => Scale::linear(Area, 4_046.856_422_4),
        "hectares" => Scale::linear(Area, 10_000.0),

        // joules
        "joules" => Scale::linear(Energy, 1.0),
        "kilojoules" => Scale::linear(Energy, 1_000.0),
        "calories" => Scale::linear(Energy, 4.184),
        "kilocalories" => Scale::linear(Energy, 4_184.0),
        "watt hours" => Scale::linear(Energy, 3_600.0),
        "kilowatt hours" => Scale::linear(Energy, 3.6e6),

        // pascals
        "pascals" => Scale::linear(Pressure, 1.0),
        "kilopascals" => Scale::linear(Pressure, 1_000.0),
        "bars" => Scale::linear(Pressure, 1e5),
        "atmospheres" => Scale::linear(Pressure, 101_325.0),
        "pounds per square inch" => Scale::linear(Pressure, 6_894.757_293_168),
        "torrs" => Scale::linear(Pressure, 101_325.0 / 760.0),

        // watts
        "watts" => Scale::linear(Power, 1.0),
        "kilowatts" => Scale::linear(Power, 1_000.0),
        "megawatts" => Scale::linear(Power, 1e6),
        "horsepower" => Scale::linear(Power, 745.699_871_582_270_2),

        // bits
        "bits" => Scale::linear(Data, 1.0),
        "kilobits" => Scale::linear(Data, 1e3),
        "megabits" => Scale::linear(Data, 1e6),
        "gigabits" => Scale::linear(Data, 1e9),
        "bytes" => Scale::linear(Data, 8.0),
        "kilobytes" => Scale::linear(Data, 8e3),
        "megabytes" => Scale::linear(Data, 8e6),
        "gigabytes" => Scale::linear(Data, 8e9),
        "terabytes" => Scale::linear(Data, 8e12),

        _ => return None,
    };
    Some(scale)
}

/// Converts between two units of the same dimension.
pub fn convert(value: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
    let not_convertible = || ConversionError::NotConvertible {
        from: from.to_string(),
        to: to.to_string(),
    };

    let (Some(source), Some(target)) = (scale_of(from), scale_of(to)) else {
        return Err(not_convertible());
    };
    if source.dimension != target.dimension {
        return Err(not_convertible());
    }

    Ok(target.from_reference(source.to_reference(value)))
}
