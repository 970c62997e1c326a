//! Measurement units and conversions
//!
//! Stock quantities are stored in whatever unit the backend recorded
//! (grams, milliliters, plain unit counts) while users type filters in
//! the unit they think in (kilograms, liters). Conversion is only
//! meaningful inside a unit family; a cross-family comparison is not an
//! error, it simply can never match.

use thiserror::Error;

/// A measurement unit as it appears on stock records
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Grams,
    Kilograms,
    Milliliters,
    Liters,
    Units,
}

/// A set of mutually convertible units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFamily {
    Mass,
    Volume,
    Count,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("unidades incompatibles: {0} y {1}")]
    Incompatible(&'static str, &'static str),

    #[error("unidad desconocida: {0}")]
    Unknown(String),
}

impl Unit {
    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Grams | Unit::Kilograms => UnitFamily::Mass,
            Unit::Milliliters | Unit::Liters => UnitFamily::Volume,
            Unit::Units => UnitFamily::Count,
        }
    }

    /// Factor to the family's base unit (g, ml, or a plain count)
    fn base_factor(&self) -> f64 {
        match self {
            Unit::Grams | Unit::Milliliters | Unit::Units => 1.0,
            Unit::Kilograms | Unit::Liters => 1000.0,
        }
    }

    /// Display label as rendered in reports
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Grams => "g",
            Unit::Kilograms => "Kg",
            Unit::Milliliters => "ml",
            Unit::Liters => "L",
            Unit::Units => "U",
        }
    }

    /// The larger unit of the same family, used for display
    pub fn display_unit(&self) -> Unit {
        match self.family() {
            UnitFamily::Mass => Unit::Kilograms,
            UnitFamily::Volume => Unit::Liters,
            UnitFamily::Count => Unit::Units,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gr" | "gramo" | "gramos" => Ok(Unit::Grams),
            "kg" | "kilo" | "kilos" | "kilogramo" | "kilogramos" => Ok(Unit::Kilograms),
            "ml" | "cc" | "mililitro" | "mililitros" => Ok(Unit::Milliliters),
            "l" | "lt" | "litro" | "litros" => Ok(Unit::Liters),
            "u" | "un" | "unidad" | "unidades" => Ok(Unit::Units),
            other => Err(UnitError::Unknown(other.to_string())),
        }
    }
}

/// Convert `quantity` from one unit to another.
///
/// Returns [`UnitError::Incompatible`] when the units belong to different
/// families; callers must treat the comparison as non-matching rather than
/// raising the error to the user.
pub fn normalize(quantity: f64, from: Unit, to: Unit) -> Result<f64, UnitError> {
    if from.family() != to.family() {
        return Err(UnitError::Incompatible(from.label(), to.label()));
    }
    Ok(quantity * from.base_factor() / to.base_factor())
}

/// Render a stored quantity for a report row, favoring the larger unit of
/// the family (`500` g -> `0.5Kg`). Trailing zeros are trimmed; the stored
/// numeric value is never altered.
pub fn display_quantity(quantity: f64, unit: Unit) -> String {
    let target = unit.display_unit();
    // Same family by construction
    let converted = normalize(quantity, unit, target).unwrap_or(quantity);
    format!("{}{}", trim_decimal(converted, 3), target.label())
}

/// Render an aggregated family total for a summary line, always with two
/// decimals for mass/volume (`12.50Kg`) and none for counts (`3U`).
pub fn display_total(total: f64, family: UnitFamily) -> String {
    match family {
        UnitFamily::Mass => format!("{:.2}Kg", total / 1000.0),
        UnitFamily::Volume => format!("{:.2}L", total / 1000.0),
        UnitFamily::Count => format!("{}U", trim_decimal(total, 2)),
    }
}

/// Format with at most `precision` decimals, trimming trailing zeros
fn trim_decimal(value: f64, precision: usize) -> String {
    let s = format!("{:.prec$}", value, prec = precision);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
