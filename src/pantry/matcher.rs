//! Ingredient resolution
//!
//! Decides which pantry item, if any, covers a recipe ingredient name.

use crate::models::PantryItem;

/// Strategy for resolving an ingredient name against a pantry snapshot
///
/// Returns the index into `pantry` so callers can resolve against a working
/// copy they are about to mutate.
pub trait IngredientMatcher {
    fn resolve(&self, pantry: &[PantryItem], ingredient: &str) -> Option<usize>;
}

/// Exact case-insensitive name first, then the first pantry entry whose name
/// contains the ingredient name or is contained by it.
///
/// Deliberately loose: "sugar" resolves to "brown sugar" if that is the first
/// containing entry, and "chicken breast" resolves to "chicken".
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactThenSubstring;

fn match_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl IngredientMatcher for ExactThenSubstring {
    fn resolve(&self, pantry: &[PantryItem], ingredient: &str) -> Option<usize> {
        let wanted = match_key(ingredient);
        if wanted.is_empty() {
            return None;
        }

        let keys: Vec<String> = pantry.iter().map(|item| match_key(&item.name)).collect();

        if let Some(index) = keys.iter().position(|key| *key == wanted) {
            return Some(index);
        }

        keys.iter().position(|key| {
            !key.is_empty() && (key.contains(wanted.as_str()) || wanted.contains(key.as_str()))
        })
    }
}
