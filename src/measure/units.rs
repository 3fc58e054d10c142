//! Unit types and conversion constants
//!
//! Recognized kitchen units map to either grams (mass) or milliliters (volume).

use serde::{Deserialize, Serialize};

/// Physical dimension of a recognized unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Normalized to grams
    Mass,
    /// Normalized to milliliters
    Volume,
}

impl Dimension {
    /// Canonical unit label for this dimension
    pub fn canonical_unit(&self) -> &'static str {
        match self {
            Dimension::Mass => "g",
            Dimension::Volume => "ml",
        }
    }
}

/// The unit a quantity is expressed in after normalization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseUnit {
    Mass,
    Volume,
    /// Label that is not in the conversion table, lower-cased. Only an
    /// identical label is compatible with it.
    Unrecognized(String),
}

impl BaseUnit {
    /// Label to display next to a normalized quantity
    pub fn label(&self) -> &str {
        match self {
            BaseUnit::Mass => Dimension::Mass.canonical_unit(),
            BaseUnit::Volume => Dimension::Volume.canonical_unit(),
            BaseUnit::Unrecognized(label) => label,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, BaseUnit::Unrecognized(_))
    }
}

impl From<Dimension> for BaseUnit {
    fn from(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Mass => BaseUnit::Mass,
            Dimension::Volume => BaseUnit::Volume,
        }
    }
}

/// Conversion of one recognized unit label into its base unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversion {
    pub dimension: Dimension,
    /// Base units per one of this unit (always positive)
    pub multiplier: f64,
}

impl UnitConversion {
    const fn mass(multiplier: f64) -> Self {
        Self { dimension: Dimension::Mass, multiplier }
    }

    const fn volume(multiplier: f64) -> Self {
        Self { dimension: Dimension::Volume, multiplier }
    }
}

// ============================================================================
// Volume Conversion Constants (to milliliters)
// ============================================================================

pub const ML_PER_TSP: f64 = 4.92892;
pub const ML_PER_TBSP: f64 = 14.7868;
pub const ML_PER_FL_OZ: f64 = 29.5735;
pub const ML_PER_CUP: f64 = 236.588;
pub const ML_PER_PINT: f64 = 473.176;
pub const ML_PER_QUART: f64 = 946.353;
pub const ML_PER_LITER: f64 = 1000.0;
pub const ML_PER_GALLON: f64 = 3785.41;

// ============================================================================
// Mass Conversion Constants (to grams)
// ============================================================================

pub const G_PER_MG: f64 = 0.001;
pub const G_PER_KG: f64 = 1000.0;
pub const G_PER_OZ: f64 = 28.3495;
pub const G_PER_LB: f64 = 453.592;
/// One stick of butter (1/4 lb)
pub const G_PER_STICK: f64 = 113.398;

// ============================================================================
// Unit Recognition
// ============================================================================

fn conversion_for(key: &str) -> Option<UnitConversion> {
    let conversion = match key {
        "g" | "gram" | "gramme" => UnitConversion::mass(1.0),
        "mg" | "milligram" => UnitConversion::mass(G_PER_MG),
        "kg" | "kilo" | "kilogram" => UnitConversion::mass(G_PER_KG),
        "oz" | "ounce" => UnitConversion::mass(G_PER_OZ),
        "lb" | "pound" => UnitConversion::mass(G_PER_LB),
        "stick" => UnitConversion::mass(G_PER_STICK),

        "ml" | "milliliter" | "millilitre" => UnitConversion::volume(1.0),
        "l" | "liter" | "litre" => UnitConversion::volume(ML_PER_LITER),
        "tsp" | "teaspoon" => UnitConversion::volume(ML_PER_TSP),
        "tbsp" | "tablespoon" => UnitConversion::volume(ML_PER_TBSP),
        "fl oz" | "floz" | "fluid ounce" => UnitConversion::volume(ML_PER_FL_OZ),
        "cup" | "c" => UnitConversion::volume(ML_PER_CUP),
        "pint" | "pt" => UnitConversion::volume(ML_PER_PINT),
        "quart" | "qt" => UnitConversion::volume(ML_PER_QUART),
        "gallon" | "gal" => UnitConversion::volume(ML_PER_GALLON),
        _ => return None,
    };
    Some(conversion)
}

/// Look up the conversion for a unit label
///
/// Matching is case-insensitive and ignores surrounding whitespace. Plural
/// forms ("cups", "lbs", "grams") resolve to their singular entry.
pub fn lookup_unit(label: &str) -> Option<UnitConversion> {
    let lower = label.to_lowercase();
    let key = lower.trim();

    if key.is_empty() {
        return None;
    }

    conversion_for(key).or_else(|| {
        key.strip_suffix('s')
            .filter(|singular| !singular.is_empty())
            .and_then(conversion_for)
    })
}
