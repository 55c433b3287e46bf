//! Static catalog of unit categories offered by the converter.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitDescriptor {
    /// Key understood by the conversion dispatcher, e.g. `"meters"`.
    pub value: &'static str,
    pub label: &'static str,
    pub abbr: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitCategory {
    pub key: &'static str,
    pub name: &'static str,
    pub units: &'static [UnitDescriptor],
}

const fn unit(value: &'static str, label: &'static str, abbr: &'static str) -> UnitDescriptor {
    UnitDescriptor { value, label, abbr }
}

static CATEGORIES: &[UnitCategory] = &[
    UnitCategory {
        key: "length",
        name: "Length",
        units: &[
            unit("meters", "Meters (m)", "m"),
            unit("kilometers", "Kilometers (km)", "km"),
            unit("centimeters", "Centimeters (cm)", "cm"),
            unit("millimeters", "Millimeters (mm)", "mm"),
            unit("inches", "Inches (in)", "in"),
            unit("feet", "Feet (ft)", "ft"),
            unit("yards", "Yards (yd)", "yd"),
            unit("miles", "Miles (mi)", "mi"),
        ],
    },
    UnitCategory {
        key: "mass",
        name: "Weight/Mass",
        units: &[
            unit("grams", "Grams (g)", "g"),
            unit("kilograms", "Kilograms (kg)", "kg"),
            unit("pounds", "Pounds (lbs)", "lbs"),
            unit("ounces", "Ounces (oz)", "oz"),
            unit("tonnes", "Tonnes (t)", "t"),
            unit("stone", "Stone (st)", "st"),
        ],
    },
    UnitCategory {
        key: "temperature",
        name: "Temperature",
        units: &[
            unit("celsius", "Celsius (°C)", "°C"),
            unit("fahrenheit", "Fahrenheit (°F)", "°F"),
            unit("kelvin", "Kelvin (K)", "K"),
        ],
    },
    UnitCategory {
        key: "volume",
        name: "Volume",
        units: &[
            unit("liters", "Liters (L)", "L"),
            unit("milliliters", "Milliliters (mL)", "mL"),
            unit("gallons", "Gallons (gal)", "gal"),
            unit("quarts", "Quarts (qt)", "qt"),
            unit("pints", "Pints (pt)", "pt"),
            unit("cups", "Cups (c)", "c"),
            unit("cubic meters", "Cubic Meters (m³)", "m³"),
            unit("cubic feet", "Cubic Feet (ft³)", "ft³"),
        ],
    },
    UnitCategory {
        key: "area",
        name: "Area",
        units: &[
            unit("square meters", "Square Meters (m²)", "m²"),
            unit("square kilometers", "Square Kilometers (km²)", "km²"),
            unit("square centimeters", "Square Centimeters (cm²)", "cm²"),
            unit("square feet", "Square Feet (ft²)", "ft²"),
            unit("square inches", "Square Inches (in²)", "in²"),
            unit("acres", "Acres (ac)", "ac"),
            unit("hectares", "Hectares (ha)", "ha"),
        ],
    },
    UnitCategory {
        key: "energy",
        name: "Energy",
        units: &[
            unit("joules", "Joules (J)", "J"),
            unit("kilojoules", "Kilojoules (kJ)", "kJ"),
            unit("calories", "Calories (cal)", "cal"),
            unit("kilocalories", "Kilocalories (kcal)", "kcal"),
            unit("watt hours", "Watt Hours (Wh)", "Wh"),
            unit("kilowatt hours", "Kilowatt Hours (kWh)", "kWh"),
        ],
    },
    UnitCategory {
        key: "pressure",
        name: "Pressure",
        units: &[
            unit("pascals", "Pascals (Pa)", "Pa"),
            unit("kilopascals", "Kilopascals (kPa)", "kPa"),
            unit("bars", "Bars (bar)", "bar"),
            unit("atmospheres", "Atmospheres (atm)", "atm"),
            unit("pounds per square inch", "PSI (psi)", "psi"),
            unit("torrs", "Torr (Torr)", "Torr"),
        ],
    },
    UnitCategory {
        key: "speed",
        name: "Speed",
        units: &[
            unit("meters per second", "Meters/Second (m/s)", "m/s"),
            unit("kilometers per hour", "Kilometers/Hour (km/h)", "km/h"),
            unit("miles per hour", "Miles/Hour (mph)", "mph"),
            unit("feet per second", "Feet/Second (ft/s)", "ft/s"),
            unit("knots", "Knots (kn)", "kn"),
        ],
    },
    UnitCategory {
        key: "power",
        name: "Power",
        units: &[
            unit("watts", "Watts (W)", "W"),
            unit("kilowatts", "Kilowatts (kW)", "kW"),
            unit("megawatts", "Megawatts (MW)", "MW"),
            unit("horsepower", "Horsepower (hp)", "hp"),
        ],
    },
    UnitCategory {
        key: "digital",
        name: "Data Storage",
        units: &[
            unit("bytes", "Bytes (B)", "B"),
            unit("kilobytes", "Kilobytes (KB)", "KB"),
            unit("megabytes", "Megabytes (MB)", "MB"),
            unit("gigabytes", "Gigabytes (GB)", "GB"),
            unit("terabytes", "Terabytes (TB)", "TB"),
            unit("bits", "Bits (bit)", "bit"),
            unit("kilobits", "Kilobits (Kb)", "Kb"),
            unit("megabits", "Megabits (Mb)", "Mb"),
            unit("gigabits", "Gigabits (Gb)", "Gb"),
        ],
    },
];

/// All categories in display order.
pub fn categories() -> &'static [UnitCategory] {
    CATEGORIES
}

pub fn find_category(key: &str) -> Option<&'static UnitCategory> {
    CATEGORIES.iter().find(|c| c.key.eq_ignore_ascii_case(key))
}

/// Finds the first category listing a unit, used when the caller gave units
/// but no category.
pub fn category_of(unit_key: &str) -> Option<&'static UnitCategory> {
    CATEGORIES.iter().find(|c| c.find_unit(unit_key).is_some())
}

impl UnitCategory {
    /// Looks a unit up by value key (case-insensitive) or exact abbreviation.
    ///
    /// Abbreviations are matched case-sensitively since `Mb` and `MB` differ.
    pub fn find_unit(&self, key_or_abbr: &str) -> Option<&'static UnitDescriptor> {
        let units: &'static [UnitDescriptor] = self.units;
        units
            .iter()
            .find(|u| u.value.eq_ignore_ascii_case(key_or_abbr))
            .or_else(|| units.iter().find(|u| u.abbr == key_or_abbr))
    }

    /// Units preselected when the category is chosen.
    pub fn default_pair(&self) -> (&'static UnitDescriptor, &'static UnitDescriptor) {
        let units: &'static [UnitDescriptor] = self.units;
        if self.key == "length" {
            if let (Some(from), Some(to)) = (self.find_unit("meters"), self.find_unit("feet")) {
                return (from, to);
            }
        }
        (&units[0], &units[1])
    }
}
