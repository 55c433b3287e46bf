//! Quick reference conversions shown by `xconv quick`.
use crate::core::convert;
use crate::core::error::ConversionError;

#[derive(Debug, Clone, Copy)]
pub struct QuickConversion {
    pub value: f64,
    pub from: &'static str,
    pub to: &'static str,
    pub category: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct QuickGroup {
    pub title: &'static str,
    pub conversions: &'static [QuickConversion],
}

const fn quick(
    value: f64,
    from: &'static str,
    to: &'static str,
    category: &'static str,
    label: &'static str,
) -> QuickConversion {
    QuickConversion {
        value,
        from,
        to,
        category,
        label,
    }
}

pub static QUICK_GROUPS: &[QuickGroup] = &[
    QuickGroup {
        title: "Popular Length",
        conversions: &[
            quick(1.0, "meters", "feet", "length", "1 meter to feet"),
            quick(1.0, "kilometers", "miles", "length", "1 km to miles"),
            quick(1.0, "inches", "centimeters", "length", "1 inch to cm"),
            quick(1.0, "feet", "meters", "length", "1 foot to meters"),
        ],
    },
    QuickGroup {
        title: "Popular Weight",
        conversions: &[
            quick(1.0, "kilograms", "pounds", "mass", "1 kg to lbs"),
            quick(1.0, "pounds", "kilograms", "mass", "1 lb to kg"),
            quick(1.0, "ounces", "grams", "mass", "1 oz to grams"),
            quick(1.0, "stone", "kilograms", "mass", "1 stone to kg"),
        ],
    },
    QuickGroup {
        title: "Popular Temperature",
        conversions: &[
            quick(0.0, "celsius", "fahrenheit", "temperature", "0°C to °F"),
            quick(32.0, "fahrenheit", "celsius", "temperature", "32°F to °C"),
            quick(100.0, "celsius", "fahrenheit", "temperature", "100°C to °F"),
            quick(273.15, "kelvin", "celsius", "temperature", "273.15K to °C"),
        ],
    },
    QuickGroup {
        title: "Popular Volume",
        conversions: &[
            quick(1.0, "liters", "gallons", "volume", "1 liter to gallons"),
            quick(1.0, "gallons", "liters", "volume", "1 gallon to liters"),
            quick(1.0, "cups", "milliliters", "volume", "1 cup to mL"),
            quick(1.0, "pints", "liters", "volume", "1 pint to liters"),
        ],
    },
];

impl QuickConversion {
    /// Result rounded to 4 decimals.
    ///
    /// Bypasses the dispatcher's zero shortcut, so 0°C is 32°F here.
    pub fn result(&self) -> Result<f64, ConversionError> {
        let value = if self.category == convert::SPEED_CATEGORY {
            convert::convert_speed(self.value, self.from, self.to)?
        } else {
            crate::core::measure::convert(self.value, self.from, self.to)?
        };
        Ok((value * 10_000.0).round() / 10_000.0)
    }
}
