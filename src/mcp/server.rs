//! Home Log MCP Server Implementation
//!
//! Implements the MCP server with the pantry, recipe and race tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::generation::{GenerationError, RecipeGenerator};
use crate::models::{
    CompletedRaceCreate, CompletedRaceUpdate, IngredientRequirement, PantryItemCreate,
    PantryItemUpdate, SavedRecipeCreate, UpcomingRaceCreate,
};
use crate::tools::pantry;
use crate::tools::races;
use crate::tools::recipes;
use crate::tools::status::StatusTracker;

/// Home Log MCP Service
#[derive(Clone)]
pub struct HomelogService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    /// Present only when an API key is configured
    generator: Option<RecipeGenerator>,
    tool_router: ToolRouter<HomelogService>,
}

impl HomelogService {
    pub fn new(database_path: PathBuf, database: Database, generator: Option<RecipeGenerator>) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                database_path,
                generator.is_some(),
            ))),
            database,
            generator,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(kind: &str, id: i64) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(format!(
        r#"{{"error": "{} not found", "id": {}}}"#,
        kind, id
    ))]))
}

// ============================================================================
// Pantry Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParam {
    /// Ingredient name, matched against pantry item names
    pub name: String,
    pub quantity: f64,
    /// Unit such as "g", "cup", "tbsp"; empty for countable items
    #[serde(default)]
    pub unit: String,
}

impl From<IngredientParam> for IngredientRequirement {
    fn from(p: IngredientParam) -> Self {
        IngredientRequirement::new(p.name, p.quantity, p.unit)
    }
}

fn requirements(params: Vec<IngredientParam>) -> Vec<IngredientRequirement> {
    params.into_iter().map(IngredientRequirement::from).collect()
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddPantryItemParams {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchPantryItemsParams {
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdatePantryItemParams {
    pub id: i64,
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeletePantryItemParams {
    pub id: i64,
}

/// A saved recipe by id, or an ad-hoc title plus ingredient list
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeRequestParams {
    pub recipe_id: Option<i64>,
    pub title: Option<String>,
    /// Overrides the saved recipe's ingredients when both are given
    pub ingredients: Option<Vec<IngredientParam>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCookHistoryParams {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    20
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveRecipeParams {
    pub title: String,
    pub ingredients: Vec<IngredientParam>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    #[serde(default)]
    pub favorites_only: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetFavoriteParams {
    pub id: i64,
    pub is_favorite: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SuggestRecipeParams {
    /// What the cook is in the mood for ("something quick", "vegetarian")
    pub request: Option<String>,
}

// ============================================================================
// Race Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogRaceParams {
    pub name: String,
    /// "5k", "10k", "1/2 marathon", "marathon" or free text like "8 mile"
    pub distance: String,
    /// H:MM:SS, M:SS or seconds
    pub time: String,
    /// YYYY-MM-DD
    pub date: String,
    pub notes: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RaceIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRaceParams {
    pub id: i64,
    pub name: Option<String>,
    pub distance: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct YearParams {
    /// A year such as "2024", or "All"; defaults to all years
    pub year: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddUpcomingRaceParams {
    pub name: String,
    pub distance: String,
    /// YYYY-MM-DD
    pub date: String,
    pub notes: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompleteUpcomingRaceParams {
    pub id: i64,
    /// Finishing time, H:MM:SS or M:SS
    pub time: String,
    /// Replaces the race's notes when given
    pub notes: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl HomelogService {
    // --- Status ---

    #[tool(description = "Get the current status of the Home Log service including build info, database status, and process information")]
    async fn homelog_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status())
    }

    #[tool(description = "Get instructions for the pantry, units and cooking tools. Call this before managing the pantry or cooking.")]
    fn pantry_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::PANTRY_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(PANTRY_INSTRUCTIONS)]))
    }

    #[tool(description = "Get instructions for logging races, upcoming races and race statistics.")]
    fn race_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::RACE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(RACE_INSTRUCTIONS)]))
    }

    // --- Pantry ---

    #[tool(description = "Add an item to the pantry with its quantity and unit")]
    fn add_pantry_item(&self, Parameters(p): Parameters<AddPantryItemParams>) -> Result<CallToolResult, McpError> {
        let data = PantryItemCreate { name: p.name, quantity: p.quantity, unit: p.unit };
        let result = pantry::add_pantry_item(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List everything in the pantry")]
    fn list_pantry_items(&self) -> Result<CallToolResult, McpError> {
        let result = pantry::list_pantry_items(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Search pantry items by name")]
    fn search_pantry_items(&self, Parameters(p): Parameters<SearchPantryItemsParams>) -> Result<CallToolResult, McpError> {
        let result = pantry::search_pantry_items(&self.database, &p.query).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update a pantry item's name, quantity or unit")]
    fn update_pantry_item(&self, Parameters(p): Parameters<UpdatePantryItemParams>) -> Result<CallToolResult, McpError> {
        let data = PantryItemUpdate { name: p.name, quantity: p.quantity, unit: p.unit };
        let result = pantry::update_pantry_item(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Remove an item from the pantry")]
    fn delete_pantry_item(&self, Parameters(p): Parameters<DeletePantryItemParams>) -> Result<CallToolResult, McpError> {
        let result = pantry::delete_pantry_item(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Check whether the pantry has enough of every ingredient for a recipe. Pass recipe_id for a saved recipe, or title plus ingredients. Changes nothing.")]
    fn check_recipe(&self, Parameters(p): Parameters<RecipeRequestParams>) -> Result<CallToolResult, McpError> {
        let result = pantry::check_recipe(&self.database, p.recipe_id, p.title, p.ingredients.map(requirements))
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Cook a recipe: subtract its ingredients from the pantry and record it in the cook history. Blocked, with nothing changed, if anything is missing or short.")]
    fn cook_recipe(&self, Parameters(p): Parameters<RecipeRequestParams>) -> Result<CallToolResult, McpError> {
        let result = pantry::cook_recipe(&self.database, p.recipe_id, p.title, p.ingredients.map(requirements))
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(cooked) => json_result(&cooked),
            Err(blocked) => json_result(&blocked),
        }
    }

    #[tool(description = "List recently cooked recipes, newest first")]
    fn list_cook_history(&self, Parameters(p): Parameters<ListCookHistoryParams>) -> Result<CallToolResult, McpError> {
        let result = pantry::list_cook_history(&self.database, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Save a recipe with its ingredients and steps")]
    fn save_recipe(&self, Parameters(p): Parameters<SaveRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = SavedRecipeCreate {
            title: p.title,
            ingredients: requirements(p.ingredients),
            instructions: p.instructions,
            is_favorite: p.is_favorite,
            notes: p.notes,
        };
        let result = recipes::save_recipe(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a saved recipe with its ingredients and steps")]
    fn get_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(recipe) => json_result(&recipe),
            None => not_found("Recipe", p.id),
        }
    }

    #[tool(description = "List saved recipes, optionally favorites only")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.favorites_only).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Flip a saved recipe's favorite flag")]
    fn toggle_favorite(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::toggle_favorite(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Mark or unmark a saved recipe as a favorite")]
    fn set_favorite(&self, Parameters(p): Parameters<SetFavoriteParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::set_favorite(&self.database, p.id, p.is_favorite).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a saved recipe (its cook history is kept)")]
    fn delete_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Suggest a recipe that uses what is in the pantry. Requires an API key; the suggestion is checked against the pantry but not saved.")]
    async fn suggest_recipe(&self, Parameters(p): Parameters<SuggestRecipeParams>) -> Result<CallToolResult, McpError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| McpError::internal_error(GenerationError::MissingApiKey.to_string(), None))?;
        let result = recipes::suggest_recipe(&self.database, generator, p.request.as_deref())
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Races ---

    #[tool(description = "Log a finished race. Reports whether it is a new personal record.")]
    fn log_race(&self, Parameters(p): Parameters<LogRaceParams>) -> Result<CallToolResult, McpError> {
        let data = CompletedRaceCreate {
            name: p.name, distance: p.distance, time: p.time, date: p.date, notes: p.notes, link: p.link,
        };
        let result = races::log_race(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a logged race")]
    fn get_race(&self, Parameters(p): Parameters<RaceIdParams>) -> Result<CallToolResult, McpError> {
        let result = races::get_race(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(race) => json_result(&race),
            None => not_found("Race", p.id),
        }
    }

    #[tool(description = "List logged races, newest first, optionally for one year")]
    fn list_races(&self, Parameters(p): Parameters<YearParams>) -> Result<CallToolResult, McpError> {
        let result = races::list_races(&self.database, p.year.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update a logged race")]
    fn update_race(&self, Parameters(p): Parameters<UpdateRaceParams>) -> Result<CallToolResult, McpError> {
        let data = CompletedRaceUpdate {
            name: p.name, distance: p.distance, time: p.time, date: p.date, notes: p.notes, link: p.link,
        };
        let result = races::update_race(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a logged race")]
    fn delete_race(&self, Parameters(p): Parameters<RaceIdParams>) -> Result<CallToolResult, McpError> {
        let result = races::delete_race(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Add a planned race to the calendar")]
    fn add_upcoming_race(&self, Parameters(p): Parameters<AddUpcomingRaceParams>) -> Result<CallToolResult, McpError> {
        let data = UpcomingRaceCreate {
            name: p.name, distance: p.distance, date: p.date, notes: p.notes, link: p.link,
        };
        let result = races::add_upcoming_race(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List upcoming races, soonest first")]
    fn list_upcoming_races(&self) -> Result<CallToolResult, McpError> {
        let result = races::list_upcoming_races(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Remove an upcoming race without logging it")]
    fn delete_upcoming_race(&self, Parameters(p): Parameters<RaceIdParams>) -> Result<CallToolResult, McpError> {
        let result = races::delete_upcoming_race(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Record the finishing time of an upcoming race, moving it into the race log. Reports whether it is a new personal record.")]
    fn complete_upcoming_race(&self, Parameters(p): Parameters<CompleteUpcomingRaceParams>) -> Result<CallToolResult, McpError> {
        let result = races::complete_upcoming_race(&self.database, p.id, &p.time, p.notes)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Race statistics for a year or \"All\": totals, average pace, per-distance bests and improvement, personal records")]
    fn race_statistics(&self, Parameters(p): Parameters<YearParams>) -> Result<CallToolResult, McpError> {
        let result = races::race_statistics(&self.database, p.year.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Best time for every distance in the race log; the standard distances (5k, 10k, 1/2 marathon, marathon) are always listed")]
    fn personal_records(&self) -> Result<CallToolResult, McpError> {
        let result = races::personal_records(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Years that have at least one logged race, newest first")]
    fn available_years(&self) -> Result<CallToolResult, McpError> {
        let result = races::available_years(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for HomelogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "homelog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Home Log".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Home Log - kitchen pantry and personal race log. \
                 IMPORTANT: Call pantry_instructions before pantry work and race_instructions before race work. \
                 Pantry: add/list/search/update/delete_pantry_item. \
                 Cooking: check_recipe (read-only), cook_recipe (subtracts ingredients, all or nothing), list_cook_history. \
                 Recipes: save/get/list/delete_recipe, toggle_favorite, set_favorite, suggest_recipe. \
                 Races: log/get/list/update/delete_race. \
                 Upcoming: add/list/delete_upcoming_race, complete_upcoming_race. \
                 Stats: race_statistics, personal_records, available_years. \
                 Status: homelog_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cook_history_limit_defaults() {
        let params: ListCookHistoryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, 20);
        let params: ListCookHistoryParams = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(params.limit, 5);
    }
}
