//! Data models
//!
//! Rust structs representing database entities.

mod cook_history;
mod pantry_item;
mod race;
mod recipe;
mod upcoming_race;

pub use cook_history::CookHistoryEntry;
pub use pantry_item::{PantryItem, PantryItemCreate, PantryItemUpdate};
pub use race::{CompletedRace, CompletedRaceCreate, CompletedRaceUpdate};
pub use recipe::{IngredientRequirement, SavedRecipe, SavedRecipeCreate};
pub use upcoming_race::{UpcomingRace, UpcomingRaceCreate};
