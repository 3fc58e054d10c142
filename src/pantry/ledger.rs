//! Pantry ledger
//!
//! Checks whether a pantry snapshot covers a recipe and computes the pantry
//! changes cooking it would cause. Both operations are pure: the snapshot is
//! never modified, and applying a plan is left to the persistence layer.

use serde::Serialize;
use thiserror::Error;

use crate::measure::{multiplier_for, BaseUnit, Quantity};
use crate::models::{IngredientRequirement, PantryItem};
use super::matcher::{ExactThenSubstring, IngredientMatcher};

/// Remaining quantities at or below this are removed from the pantry
pub const CONSUMPTION_EPSILON: f64 = 0.001;

/// Why a recipe cannot be cooked from the pantry
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerError {
    #[error("No pantry item found for '{name}'")]
    MissingIngredient { name: String },

    #[error("Not enough {name}: need {needed}, have {available}")]
    InsufficientIngredient {
        name: String,
        needed: Quantity,
        available: Quantity,
    },

    #[error("Cannot compare units for {name}: need {needed}, have {available}")]
    IncompatibleUnits {
        name: String,
        needed: Quantity,
        available: Quantity,
    },
}

/// What to do when a requirement and its pantry item use incompatible units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Compare and subtract the raw numbers, ignoring the units
    #[default]
    RawQuantity,
    /// Fail with `LedgerError::IncompatibleUnits`
    Reject,
}

/// Comparison rules for the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    pub on_incompatible_units: MismatchPolicy,
    /// Treat grams and milliliters as interchangeable (water density)
    pub bridge_mass_volume: bool,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            on_incompatible_units: MismatchPolicy::RawQuantity,
            bridge_mass_volume: true,
        }
    }
}

/// A single pantry change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PantryAction {
    Update {
        id: i64,
        name: String,
        quantity: f64,
        unit: String,
    },
    Delete { id: i64, name: String },
}

impl PantryAction {
    pub fn id(&self) -> i64 {
        match self {
            PantryAction::Update { id, .. } | PantryAction::Delete { id, .. } => *id,
        }
    }
}

/// Pantry changes for one cooked recipe, one action per touched item
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsumptionPlan {
    pub actions: Vec<PantryAction>,
}

impl ConsumptionPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn deleted_ids(&self) -> Vec<i64> {
        self.actions
            .iter()
            .filter(|a| matches!(a, PantryAction::Delete { .. }))
            .map(PantryAction::id)
            .collect()
    }

    pub fn updated_ids(&self) -> Vec<i64> {
        self.actions
            .iter()
            .filter(|a| matches!(a, PantryAction::Update { .. }))
            .map(PantryAction::id)
            .collect()
    }
}

/// How a requirement was compared to its pantry item
#[derive(Debug, Clone, Copy)]
enum Comparison {
    /// Both sides in the same base unit
    Normalized { available: f64, needed: f64 },
    /// Units incompatible; raw numbers
    Raw { available: f64, needed: f64 },
}

impl Comparison {
    fn is_short(&self) -> bool {
        match *self {
            Comparison::Normalized { available, needed } | Comparison::Raw { available, needed } => {
                available < needed
            }
        }
    }
}

/// Sufficiency checker and consumption planner
#[derive(Debug, Clone, Default)]
pub struct PantryLedger<M = ExactThenSubstring> {
    matcher: M,
    policy: LedgerPolicy,
}

impl PantryLedger {
    /// Default matcher with the given policy
    pub fn with_policy(policy: LedgerPolicy) -> Self {
        Self {
            matcher: ExactThenSubstring,
            policy,
        }
    }
}

impl<M: IngredientMatcher> PantryLedger<M> {
    pub fn new(matcher: M, policy: LedgerPolicy) -> Self {
        Self { matcher, policy }
    }

    fn units_compatible(&self, a: &BaseUnit, b: &BaseUnit) -> bool {
        if a == b {
            return true;
        }
        self.policy.bridge_mass_volume && a.is_recognized() && b.is_recognized()
    }

    fn compare(
        &self,
        name: &str,
        available: &Quantity,
        needed: &Quantity,
    ) -> Result<Comparison, LedgerError> {
        let have = available.normalize();
        let need = needed.normalize();

        if self.units_compatible(&have.base_unit, &need.base_unit) {
            return Ok(Comparison::Normalized {
                available: have.quantity,
                needed: need.quantity,
            });
        }

        match self.policy.on_incompatible_units {
            MismatchPolicy::RawQuantity => {
                tracing::warn!(
                    "Incompatible units for '{}': have {}, need {}. Comparing raw quantities.",
                    name,
                    available,
                    needed
                );
                Ok(Comparison::Raw {
                    available: available.amount,
                    needed: needed.amount,
                })
            }
            MismatchPolicy::Reject => Err(LedgerError::IncompatibleUnits {
                name: name.to_string(),
                needed: needed.clone(),
                available: available.clone(),
            }),
        }
    }

    fn resolve<'a>(
        &self,
        pantry: &'a [PantryItem],
        requirement: &IngredientRequirement,
    ) -> Result<(usize, &'a PantryItem), LedgerError> {
        self.matcher
            .resolve(pantry, &requirement.name)
            .map(|index| (index, &pantry[index]))
            .ok_or_else(|| LedgerError::MissingIngredient {
                name: requirement.name.clone(),
            })
    }

    /// Check that every requirement is covered by the pantry
    ///
    /// Stops at the first requirement that fails and returns that failure.
    pub fn check_sufficiency(
        &self,
        pantry: &[PantryItem],
        requirements: &[IngredientRequirement],
    ) -> Result<(), LedgerError> {
        for requirement in requirements {
            let (_, item) = self.resolve(pantry, requirement)?;
            tracing::debug!("'{}' resolved to pantry item {} ('{}')", requirement.name, item.id, item.name);

            let comparison = self.compare(&requirement.name, &item.quantity, &requirement.quantity)?;
            if comparison.is_short() {
                return Err(LedgerError::InsufficientIngredient {
                    name: requirement.name.clone(),
                    needed: requirement.quantity.clone(),
                    available: item.quantity.clone(),
                });
            }
        }

        Ok(())
    }

    /// Compute the pantry changes for cooking a recipe
    ///
    /// Runs the sufficiency check first; on failure no plan is produced.
    /// Only touched items appear in the plan. An item whose remainder is at
    /// or below `CONSUMPTION_EPSILON` is deleted rather than updated.
    pub fn plan_consumption(
        &self,
        pantry: &[PantryItem],
        requirements: &[IngredientRequirement],
    ) -> Result<ConsumptionPlan, LedgerError> {
        self.check_sufficiency(pantry, requirements)?;

        let mut working = pantry.to_vec();
        let mut touched: Vec<usize> = Vec::new();

        for requirement in requirements {
            let (index, _) = self.resolve(&working, requirement)?;
            let item = &mut working[index];

            let decrement = match self.compare(&requirement.name, &item.quantity, &requirement.quantity)? {
                Comparison::Normalized { needed, .. } => needed / multiplier_for(&item.quantity.unit),
                Comparison::Raw { needed, .. } => needed,
            };
            item.quantity.amount -= decrement;

            if !touched.contains(&index) {
                touched.push(index);
            }
        }

        let actions = touched
            .into_iter()
            .map(|index| {
                let item = &working[index];
                if item.quantity.amount <= CONSUMPTION_EPSILON {
                    PantryAction::Delete {
                        id: item.id,
                        name: item.name.clone(),
                    }
                } else {
                    PantryAction::Update {
                        id: item.id,
                        name: item.name.clone(),
                        quantity: item.quantity.amount,
                        unit: item.quantity.unit.clone(),
                    }
                }
            })
            .collect();

        Ok(ConsumptionPlan { actions })
    }
}

/// Check sufficiency with the default matcher and policy
pub fn check_sufficiency(
    pantry: &[PantryItem],
    requirements: &[IngredientRequirement],
) -> Result<(), LedgerError> {
    PantryLedger::with_policy(LedgerPolicy::default()).check_sufficiency(pantry, requirements)
}

/// Plan consumption with the default matcher and policy
pub fn plan_consumption(
    pantry: &[PantryItem],
    requirements: &[IngredientRequirement],
) -> Result<ConsumptionPlan, LedgerError> {
    PantryLedger::with_policy(LedgerPolicy::default()).plan_consumption(pantry, requirements)
}
