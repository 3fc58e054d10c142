//! Saved Recipe model
//!
//! Recipes kept from suggestions, with their ingredient requirements and a
//! favorite flag.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::measure::Quantity;

/// One ingredient a recipe needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRequirement {
    pub name: String,
    pub quantity: Quantity,
}

impl IngredientRequirement {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: Quantity::new(amount, unit),
        }
    }
}

/// A saved recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRecipe {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<IngredientRequirement>,
    pub instructions: Vec<String>,
    pub is_favorite: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for saving a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRecipeCreate {
    pub title: String,
    pub ingredients: Vec<IngredientRequirement>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub notes: Option<String>,
}

/// Intermediate row; JSON columns are decoded outside the rusqlite closure
struct RawRecipeRow {
    id: i64,
    title: String,
    ingredients_json: String,
    instructions_json: String,
    is_favorite: bool,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RawRecipeRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            ingredients_json: row.get("ingredients_json")?,
            instructions_json: row.get("instructions_json")?,
            is_favorite: row.get::<_, i32>("is_favorite")? != 0,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn decode(self) -> DbResult<SavedRecipe> {
        Ok(SavedRecipe {
            id: self.id,
            title: self.title,
            ingredients: serde_json::from_str(&self.ingredients_json)?,
            instructions: serde_json::from_str(&self.instructions_json)?,
            is_favorite: self.is_favorite,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl SavedRecipe {
    /// Save a recipe
    pub fn create(conn: &Connection, data: &SavedRecipeCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO saved_recipes (title, ingredients_json, instructions_json, is_favorite, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.title,
                serde_json::to_string(&data.ingredients)?,
                serde_json::to_string(&data.instructions)?,
                data.is_favorite as i32,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a saved recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM saved_recipes WHERE id = ?1")?;

        match stmt.query_row([id], RawRecipeRow::from_row) {
            Ok(raw) => Ok(Some(raw.decode()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List saved recipes, newest first
    pub fn list(conn: &Connection, favorites_only: bool) -> DbResult<Vec<Self>> {
        let sql = if favorites_only {
            "SELECT * FROM saved_recipes WHERE is_favorite = 1 ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT * FROM saved_recipes ORDER BY created_at DESC, id DESC"
        };

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], RawRecipeRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRecipeRow::decode).collect()
    }

    /// IDs of all favorite recipes
    pub fn favorite_ids(conn: &Connection) -> DbResult<Vec<i64>> {
        let mut stmt = conn.prepare("SELECT id FROM saved_recipes WHERE is_favorite = 1 ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Set the favorite flag; returns false if the recipe does not exist
    pub fn set_favorite(conn: &Connection, id: i64, favorite: bool) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE saved_recipes SET is_favorite = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![favorite as i32, id],
        )?;
        Ok(rows > 0)
    }

    /// Flip the favorite flag, returning the new state
    pub fn toggle_favorite(conn: &Connection, id: i64) -> DbResult<Option<bool>> {
        let rows = conn.execute(
            "UPDATE saved_recipes SET is_favorite = 1 - is_favorite, updated_at = datetime('now') WHERE id = ?1",
            [id],
        )?;
        if rows == 0 {
            return Ok(None);
        }

        let favorite: i32 = conn.query_row(
            "SELECT is_favorite FROM saved_recipes WHERE id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(Some(favorite != 0))
    }

    /// Delete a saved recipe
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM saved_recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn save(conn: &Connection, title: &str, favorite: bool) -> SavedRecipe {
        SavedRecipe::create(
            conn,
            &SavedRecipeCreate {
                title: title.to_string(),
                ingredients: vec![
                    IngredientRequirement::new("flour", 2.0, "cup"),
                    IngredientRequirement::new("eggs", 2.0, ""),
                ],
                instructions: vec!["Mix".to_string(), "Bake".to_string()],
                is_favorite: favorite,
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_create_round_trips_ingredients() {
        let conn = conn();
        let recipe = save(&conn, "Pancakes", false);

        let loaded = SavedRecipe::get_by_id(&conn, recipe.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Pancakes");
        assert_eq!(loaded.ingredients.len(), 2);
        assert_eq!(loaded.ingredients[0].quantity, Quantity::new(2.0, "cup"));
        assert_eq!(loaded.instructions, vec!["Mix", "Bake"]);
        assert!(!loaded.is_favorite);
    }

    #[test]
    fn test_toggle_favorite_twice_restores_favorites() {
        let conn = conn();
        let keep = save(&conn, "Soup", true);
        let recipe = save(&conn, "Bread", false);

        let before = SavedRecipe::favorite_ids(&conn).unwrap();
        assert_eq!(before, vec![keep.id]);

        assert_eq!(SavedRecipe::toggle_favorite(&conn, recipe.id).unwrap(), Some(true));
        assert_eq!(
            SavedRecipe::favorite_ids(&conn).unwrap(),
            vec![keep.id, recipe.id]
        );
        assert_eq!(SavedRecipe::toggle_favorite(&conn, recipe.id).unwrap(), Some(false));

        assert_eq!(SavedRecipe::favorite_ids(&conn).unwrap(), before);
    }

    #[test]
    fn test_toggle_missing_recipe() {
        let conn = conn();
        assert_eq!(SavedRecipe::toggle_favorite(&conn, 99).unwrap(), None);
        assert!(!SavedRecipe::set_favorite(&conn, 99, true).unwrap());
    }

    #[test]
    fn test_list_favorites_only() {
        let conn = conn();
        save(&conn, "Soup", true);
        save(&conn, "Bread", false);

        assert_eq!(SavedRecipe::list(&conn, false).unwrap().len(), 2);
        let favorites = SavedRecipe::list(&conn, true).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].title, "Soup");
    }
}
