//! Pantry ledger module
//!
//! Ingredient resolution, sufficiency checks and consumption planning over a
//! pantry snapshot.

pub mod ledger;
pub mod matcher;

pub use ledger::{
    check_sufficiency, plan_consumption, ConsumptionPlan, LedgerError, LedgerPolicy,
    MismatchPolicy, PantryAction, PantryLedger, CONSUMPTION_EPSILON,
};
pub use matcher::{ExactThenSubstring, IngredientMatcher};
