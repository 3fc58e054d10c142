//! Quantity normalization
//!
//! Converts a quantity/unit pair into its base unit so that quantities written
//! in different units can be compared.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::units::{lookup_unit, BaseUnit};

/// An amount paired with a free-form unit label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

impl Quantity {
    pub fn new(amount: f64, unit: impl Into<String>) -> Self {
        Self {
            amount,
            unit: unit.into(),
        }
    }

    /// Normalize this quantity to its base unit
    pub fn normalize(&self) -> Normalized {
        normalize(self.amount, &self.unit)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.trim();
        if unit.is_empty() {
            write!(f, "{}", self.amount)
        } else {
            write!(f, "{} {}", self.amount, unit)
        }
    }
}

/// A quantity expressed in its base unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    pub quantity: f64,
    pub base_unit: BaseUnit,
}

/// Normalize a quantity to its base unit
///
/// Recognized units are multiplied into grams or milliliters. Anything else is
/// returned unchanged with the lower-cased label as its own base unit.
///
/// Examples:
/// - (2.0, "cups") -> Normalized { quantity: 473.176, base_unit: Volume }
/// - (1.0, "kg") -> Normalized { quantity: 1000.0, base_unit: Mass }
/// - (3.0, "Cloves") -> Normalized { quantity: 3.0, base_unit: Unrecognized("cloves") }
pub fn normalize(quantity: f64, unit: &str) -> Normalized {
    match lookup_unit(unit) {
        Some(conversion) => Normalized {
            quantity: quantity * conversion.multiplier,
            base_unit: conversion.dimension.into(),
        },
        None => Normalized {
            quantity,
            base_unit: BaseUnit::Unrecognized(unit.to_lowercase()),
        },
    }
}

/// Base units per one of the given unit; 1.0 when the unit is not recognized
pub fn multiplier_for(unit: &str) -> f64 {
    lookup_unit(unit).map_or(1.0, |c| c.multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::units::{G_PER_KG, ML_PER_CUP, ML_PER_TSP};

    #[test]
    fn test_normalize_recognized_round_trip() {
        for (q, unit) in [(2.0, "cup"), (0.5, "kg"), (3.0, "tsp"), (7.25, "oz"), (1.0, "stick")] {
            let normalized = normalize(q, unit);
            let back = normalized.quantity / multiplier_for(unit);
            assert!((back - q).abs() < 1e-9, "{} {} round-trips to {}", q, unit, back);
        }
    }

    #[test]
    fn test_normalize_unrecognized_is_identity() {
        let normalized = normalize(3.0, "Cloves");
        assert_eq!(normalized.quantity, 3.0);
        assert_eq!(normalized.base_unit, BaseUnit::Unrecognized("cloves".to_string()));

        let empty = normalize(2.0, "");
        assert_eq!(empty.quantity, 2.0);
        assert_eq!(empty.base_unit, BaseUnit::Unrecognized(String::new()));
    }

    #[test]
    fn test_plural_and_singular_agree() {
        assert_eq!(normalize(5.0, "cups"), normalize(5.0, "cup"));
        assert_eq!(normalize(5.0, "Teaspoons"), normalize(5.0, "tsp"));
    }

    #[test]
    fn test_normalize_values() {
        let cups = normalize(2.0, "cups");
        assert_eq!(cups.base_unit, BaseUnit::Volume);
        assert!((cups.quantity - 2.0 * ML_PER_CUP).abs() < 1e-9);

        let kg = normalize(1.0, "kg");
        assert_eq!(kg.base_unit, BaseUnit::Mass);
        assert_eq!(kg.quantity, G_PER_KG);

        let tsp = Quantity::new(1.0, "tsp").normalize();
        assert!((tsp.quantity - ML_PER_TSP).abs() < 1e-9);
    }

    #[test]
    fn test_quantity_display() {
        assert_eq!(Quantity::new(1.0, "kg").to_string(), "1 kg");
        assert_eq!(Quantity::new(2.5, "").to_string(), "2.5");
    }
}
