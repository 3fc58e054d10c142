//! Recipe MCP Tools
//!
//! Saved recipes, favorites and recipe suggestions.

use serde::Serialize;

use crate::db::Database;
use crate::generation::{GeneratedRecipe, RecipeGenerator};
use crate::models::{IngredientRequirement, PantryItem, SavedRecipe, SavedRecipeCreate};
use crate::pantry::{LedgerError, LedgerPolicy, PantryLedger};

/// Response for save_recipe
#[derive(Debug, Serialize)]
pub struct SaveRecipeResponse {
    pub id: i64,
    pub title: String,
    pub is_favorite: bool,
    pub created_at: String,
}

/// Summary of a saved recipe for list results
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub ingredient_count: usize,
    pub is_favorite: bool,
    pub created_at: String,
}

impl From<&SavedRecipe> for RecipeSummary {
    fn from(recipe: &SavedRecipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            ingredient_count: recipe.ingredients.len(),
            is_favorite: recipe.is_favorite,
            created_at: recipe.created_at.clone(),
        }
    }
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: usize,
    pub favorites_only: bool,
}

/// Response for toggle_favorite and set_favorite
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: i64,
    pub is_favorite: bool,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct DeleteRecipeResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for suggest_recipe
#[derive(Debug, Serialize)]
pub struct SuggestRecipeResponse {
    pub recipe: GeneratedRecipe,
    pub model: String,
    /// Whether the current pantry covers the suggestion
    pub can_cook: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<LedgerError>,
}

/// Save a recipe for later
pub fn save_recipe(db: &Database, data: SavedRecipeCreate) -> Result<SaveRecipeResponse, String> {
    let title = data.title.trim();
    if title.is_empty() {
        return Err("Recipe title cannot be empty".to_string());
    }
    if data.ingredients.is_empty() {
        return Err("Recipe needs at least one ingredient".to_string());
    }
    if let Some(bad) = data
        .ingredients
        .iter()
        .find(|i| i.name.trim().is_empty() || !i.quantity.amount.is_finite() || i.quantity.amount < 0.0)
    {
        return Err(format!("Invalid ingredient: '{}' {}", bad.name, bad.quantity));
    }

    let data = SavedRecipeCreate {
        title: title.to_string(),
        ..data
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let recipe = SavedRecipe::create(&conn, &data)
        .map_err(|e| format!("Failed to save recipe: {}", e))?;

    tracing::info!("Saved recipe '{}' ({} ingredients)", recipe.title, recipe.ingredients.len());

    Ok(SaveRecipeResponse {
        id: recipe.id,
        title: recipe.title,
        is_favorite: recipe.is_favorite,
        created_at: recipe.created_at,
    })
}

/// Get a saved recipe with its ingredients and steps
pub fn get_recipe(db: &Database, id: i64) -> Result<Option<SavedRecipe>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    SavedRecipe::get_by_id(&conn, id).map_err(|e| format!("Failed to get recipe: {}", e))
}

/// List saved recipes, optionally favorites only
pub fn list_recipes(db: &Database, favorites_only: bool) -> Result<ListRecipesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let recipes = SavedRecipe::list(&conn, favorites_only)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;

    let recipes: Vec<RecipeSummary> = recipes.iter().map(RecipeSummary::from).collect();
    let total = recipes.len();

    Ok(ListRecipesResponse {
        recipes,
        total,
        favorites_only,
    })
}

/// Flip a recipe's favorite flag
pub fn toggle_favorite(db: &Database, id: i64) -> Result<FavoriteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let is_favorite = SavedRecipe::toggle_favorite(&conn, id)
        .map_err(|e| format!("Failed to toggle favorite: {}", e))?
        .ok_or_else(|| format!("Recipe not found with id: {}", id))?;

    Ok(FavoriteResponse { id, is_favorite })
}

/// Set a recipe's favorite flag explicitly
pub fn set_favorite(db: &Database, id: i64, favorite: bool) -> Result<FavoriteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let found = SavedRecipe::set_favorite(&conn, id, favorite)
        .map_err(|e| format!("Failed to set favorite: {}", e))?;

    if !found {
        return Err(format!("Recipe not found with id: {}", id));
    }

    Ok(FavoriteResponse {
        id,
        is_favorite: favorite,
    })
}

/// Delete a saved recipe; cook history keeps its title
pub fn delete_recipe(db: &Database, id: i64) -> Result<DeleteRecipeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = SavedRecipe::delete(&conn, id)
        .map_err(|e| format!("Failed to delete recipe: {}", e))?;

    if !deleted {
        return Err(format!("Recipe not found with id: {}", id));
    }

    Ok(DeleteRecipeResponse {
        success: true,
        deleted_id: id,
    })
}

/// Check a list of requirements against the current pantry
fn pantry_covers(db: &Database, requirements: &[IngredientRequirement]) -> Result<Option<LedgerError>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let pantry = PantryItem::list(&conn)
        .map_err(|e| format!("Failed to read pantry: {}", e))?;

    Ok(PantryLedger::with_policy(LedgerPolicy::default())
        .check_sufficiency(&pantry, requirements)
        .err())
}

/// Ask the text-generation API for a recipe using what is in the pantry
pub async fn suggest_recipe(
    db: &Database,
    generator: &RecipeGenerator,
    request: Option<&str>,
) -> Result<SuggestRecipeResponse, String> {
    let pantry = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        PantryItem::list(&conn).map_err(|e| format!("Failed to read pantry: {}", e))?
    };

    if pantry.is_empty() {
        return Err("The pantry is empty; add some items before asking for a recipe".to_string());
    }

    let recipe = generator
        .suggest(&pantry, request)
        .await
        .map_err(|e| format!("Recipe suggestion failed: {}", e))?;

    tracing::info!("Suggested recipe '{}'", recipe.title);

    let problem = pantry_covers(db, &recipe.ingredients)?;

    Ok(SuggestRecipeResponse {
        model: generator.model().to_string(),
        can_cook: problem.is_none(),
        problem,
        recipe,
    })
}
