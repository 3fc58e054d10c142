//! Measurement module
//!
//! Unit recognition and normalization of quantities to a common base unit.

pub mod converter;
pub mod units;

pub use converter::{multiplier_for, normalize, Normalized, Quantity};
pub use units::{lookup_unit, BaseUnit, Dimension, UnitConversion};
