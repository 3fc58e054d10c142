//! Pantry MCP Tools
//!
//! Tools for keeping the pantry up to date and cooking recipes from it.

use serde::Serialize;
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::measure::normalize;
use crate::models::{
    CookHistoryEntry, IngredientRequirement, PantryItem, PantryItemCreate, PantryItemUpdate,
    SavedRecipe,
};
use crate::pantry::{ConsumptionPlan, LedgerError, PantryAction, PantryLedger, LedgerPolicy};

/// Why cooking a recipe failed
#[derive(Debug, Error)]
pub enum CookError {
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("Failed to update pantry: {0}")]
    Persistence(#[from] DbError),
}

/// Summary of a pantry item for list/search results
#[derive(Debug, Serialize)]
pub struct PantryItemSummary {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    /// Quantity in the canonical base unit ("g" or "ml"), when the unit is known
    pub base_quantity: Option<f64>,
    pub base_unit: Option<String>,
}

impl From<&PantryItem> for PantryItemSummary {
    fn from(item: &PantryItem) -> Self {
        let normalized = normalize(item.quantity.amount, &item.quantity.unit);
        let recognized = normalized.base_unit.is_recognized();

        Self {
            id: item.id,
            name: item.name.clone(),
            quantity: item.quantity.amount,
            unit: item.quantity.unit.clone(),
            base_quantity: recognized.then_some(normalized.quantity),
            base_unit: recognized.then(|| normalized.base_unit.label().to_string()),
        }
    }
}

/// Response for add_pantry_item
#[derive(Debug, Serialize)]
pub struct AddPantryItemResponse {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub created_at: String,
}

/// Response for list_pantry_items and search_pantry_items
#[derive(Debug, Serialize)]
pub struct ListPantryItemsResponse {
    pub items: Vec<PantryItemSummary>,
    pub total: usize,
}

/// Response for update_pantry_item
#[derive(Debug, Serialize)]
pub struct UpdatePantryItemResponse {
    pub success: bool,
    pub item: PantryItemSummary,
    pub updated_at: String,
}

/// Response for delete_pantry_item
#[derive(Debug, Serialize)]
pub struct DeletePantryItemResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for check_recipe
#[derive(Debug, Serialize)]
pub struct CheckRecipeResponse {
    pub recipe_title: String,
    pub can_cook: bool,
    /// First requirement the pantry does not cover
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<LedgerError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for a successful cook_recipe
#[derive(Debug, Serialize)]
pub struct CookRecipeResponse {
    pub success: bool,
    pub history_id: i64,
    pub recipe_title: String,
    pub cooked_at: String,
    pub pantry_changes: Vec<PantryAction>,
    pub removed_items: Vec<i64>,
}

/// Response for cook_recipe when the pantry does not cover the recipe
#[derive(Debug, Serialize)]
pub struct CookBlockedResponse {
    pub error: String,
    pub reason: LedgerError,
}

/// Response for list_cook_history
#[derive(Debug, Serialize)]
pub struct ListCookHistoryResponse {
    pub entries: Vec<CookHistoryEntry>,
    pub total: usize,
}

fn validate_quantity(quantity: f64) -> Result<(), String> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err("quantity must be a non-negative number".to_string());
    }
    Ok(())
}

/// Add an item to the pantry
pub fn add_pantry_item(db: &Database, data: PantryItemCreate) -> Result<AddPantryItemResponse, String> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err("Pantry item name cannot be empty".to_string());
    }
    validate_quantity(data.quantity)?;

    let data = PantryItemCreate {
        name: name.to_string(),
        quantity: data.quantity,
        unit: data.unit.trim().to_string(),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let item = PantryItem::create(&conn, &data)
        .map_err(|e| format!("Failed to add pantry item: {}", e))?;

    tracing::info!("Added pantry item {} ({})", item.name, item.quantity);

    Ok(AddPantryItemResponse {
        id: item.id,
        name: item.name,
        quantity: item.quantity.amount,
        unit: item.quantity.unit,
        created_at: item.created_at,
    })
}

/// List everything in the pantry
pub fn list_pantry_items(db: &Database) -> Result<ListPantryItemsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let items = PantryItem::list(&conn)
        .map_err(|e| format!("Failed to list pantry items: {}", e))?;

    let items: Vec<PantryItemSummary> = items.iter().map(PantryItemSummary::from).collect();
    let total = items.len();

    Ok(ListPantryItemsResponse { items, total })
}

/// Search pantry items by name
pub fn search_pantry_items(db: &Database, query: &str) -> Result<ListPantryItemsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let items = PantryItem::search(&conn, query.trim())
        .map_err(|e| format!("Search failed: {}", e))?;

    let items: Vec<PantryItemSummary> = items.iter().map(PantryItemSummary::from).collect();
    let total = items.len();

    Ok(ListPantryItemsResponse { items, total })
}

/// Edit a pantry item's name, quantity or unit
pub fn update_pantry_item(
    db: &Database,
    id: i64,
    data: PantryItemUpdate,
) -> Result<UpdatePantryItemResponse, String> {
    if let Some(quantity) = data.quantity {
        validate_quantity(quantity)?;
    }
    if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err("Pantry item name cannot be empty".to_string());
    }

    let data = PantryItemUpdate {
        name: data.name.map(|n| n.trim().to_string()),
        quantity: data.quantity,
        unit: data.unit.map(|u| u.trim().to_string()),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let updated = PantryItem::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update pantry item: {}", e))?;

    match updated {
        Some(item) => Ok(UpdatePantryItemResponse {
            success: true,
            updated_at: item.updated_at.clone(),
            item: PantryItemSummary::from(&item),
        }),
        None => Err(format!("Pantry item not found with id: {}", id)),
    }
}

/// Remove an item from the pantry
pub fn delete_pantry_item(db: &Database, id: i64) -> Result<DeletePantryItemResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = PantryItem::delete(&conn, id)
        .map_err(|e| format!("Failed to delete pantry item: {}", e))?;

    if !deleted {
        return Err(format!("Pantry item not found with id: {}", id));
    }

    Ok(DeletePantryItemResponse {
        success: true,
        deleted_id: id,
    })
}

/// Work out which recipe is meant: a saved recipe by id, or an ad-hoc list
///
/// Explicit ingredients override the saved recipe's list.
fn resolve_recipe(
    db: &Database,
    recipe_id: Option<i64>,
    title: Option<String>,
    ingredients: Option<Vec<IngredientRequirement>>,
) -> Result<(String, Vec<IngredientRequirement>), String> {
    match recipe_id {
        Some(id) => {
            let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
            let recipe = SavedRecipe::get_by_id(&conn, id)
                .map_err(|e| format!("Failed to get recipe: {}", e))?
                .ok_or_else(|| format!("Recipe not found with id: {}", id))?;

            Ok((
                title.unwrap_or(recipe.title),
                ingredients.unwrap_or(recipe.ingredients),
            ))
        }
        None => {
            let title = title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| "Either recipe_id or title is required".to_string())?;
            let ingredients = ingredients
                .ok_or_else(|| "ingredients are required when recipe_id is not given".to_string())?;
            Ok((title, ingredients))
        }
    }
}

/// Check whether the pantry covers a recipe without changing anything
pub fn check_recipe(
    db: &Database,
    recipe_id: Option<i64>,
    title: Option<String>,
    ingredients: Option<Vec<IngredientRequirement>>,
) -> Result<CheckRecipeResponse, String> {
    let (recipe_title, requirements) = resolve_recipe(db, recipe_id, title, ingredients)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let pantry = PantryItem::list(&conn)
        .map_err(|e| format!("Failed to read pantry: {}", e))?;

    let ledger = PantryLedger::with_policy(LedgerPolicy::default());
    Ok(match ledger.check_sufficiency(&pantry, &requirements) {
        Ok(()) => CheckRecipeResponse {
            recipe_title,
            can_cook: true,
            problem: None,
            message: None,
        },
        Err(problem) => CheckRecipeResponse {
            recipe_title,
            can_cook: false,
            message: Some(problem.to_string()),
            problem: Some(problem),
        },
    })
}

/// Cook a recipe: consume its ingredients and record it in the history
///
/// The pantry is read, checked and updated inside one transaction. If the
/// pantry does not cover the recipe, or any write fails, nothing changes.
pub fn cook(
    db: &Database,
    recipe_title: &str,
    recipe_id: Option<i64>,
    requirements: &[IngredientRequirement],
    policy: LedgerPolicy,
) -> Result<(CookHistoryEntry, ConsumptionPlan), CookError> {
    let ledger = PantryLedger::with_policy(policy);

    db.with_transaction(|tx| {
        let pantry = PantryItem::list(tx)?;
        let plan = ledger.plan_consumption(&pantry, requirements)?;

        for action in &plan.actions {
            match action {
                PantryAction::Update { id, quantity, .. } => {
                    PantryItem::set_quantity(tx, *id, *quantity)?;
                }
                PantryAction::Delete { id, .. } => {
                    PantryItem::delete(tx, *id)?;
                }
            }
        }

        let entry = CookHistoryEntry::create(tx, recipe_title, recipe_id, requirements)?;
        Ok((entry, plan))
    })
}

/// Cook a recipe (blocked when the pantry does not cover it)
pub fn cook_recipe(
    db: &Database,
    recipe_id: Option<i64>,
    title: Option<String>,
    ingredients: Option<Vec<IngredientRequirement>>,
) -> Result<Result<CookRecipeResponse, CookBlockedResponse>, String> {
    let (recipe_title, requirements) = resolve_recipe(db, recipe_id, title, ingredients)?;

    match cook(db, &recipe_title, recipe_id, &requirements, LedgerPolicy::default()) {
        Ok((entry, plan)) => {
            tracing::info!(
                "Cooked '{}': {} pantry item(s) changed, {} removed",
                recipe_title,
                plan.actions.len(),
                plan.deleted_ids().len()
            );

            Ok(Ok(CookRecipeResponse {
                success: true,
                history_id: entry.id,
                recipe_title: entry.recipe_title,
                cooked_at: entry.cooked_at,
                removed_items: plan.deleted_ids(),
                pantry_changes: plan.actions,
            }))
        }
        Err(CookError::Ledger(reason)) => {
            tracing::info!("Cannot cook '{}': {}", recipe_title, reason);
            Ok(Err(CookBlockedResponse {
                error: format!("Cannot cook {}: {}", recipe_title, reason),
                reason,
            }))
        }
        Err(e @ CookError::Persistence(_)) => Err(e.to_string()),
    }
}

/// List recently cooked recipes, newest first
pub fn list_cook_history(db: &Database, limit: i64) -> Result<ListCookHistoryResponse, String> {
    let limit = limit.clamp(1, 200);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let entries = CookHistoryEntry::list(&conn, limit)
        .map_err(|e| format!("Failed to list cook history: {}", e))?;
    let total = entries.len();

    Ok(ListCookHistoryResponse { entries, total })
}
