//! Cook History model
//!
//! One entry per cooked recipe, written together with the pantry changes.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::IngredientRequirement;

/// A cooked recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookHistoryEntry {
    pub id: i64,
    pub recipe_title: String,
    pub recipe_id: Option<i64>,
    pub ingredients: Vec<IngredientRequirement>,
    pub cooked_at: String,
}

impl CookHistoryEntry {
    fn from_row(row: &Row) -> rusqlite::Result<(Self, String)> {
        Ok((
            Self {
                id: row.get("id")?,
                recipe_title: row.get("recipe_title")?,
                recipe_id: row.get("recipe_id")?,
                ingredients: Vec::new(),
                cooked_at: row.get("cooked_at")?,
            },
            row.get("ingredients_json")?,
        ))
    }

    fn decode((mut entry, json): (Self, String)) -> DbResult<Self> {
        entry.ingredients = serde_json::from_str(&json)?;
        Ok(entry)
    }

    /// Record a cooked recipe
    pub fn create(
        conn: &Connection,
        recipe_title: &str,
        recipe_id: Option<i64>,
        ingredients: &[IngredientRequirement],
    ) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO cook_history (recipe_title, recipe_id, ingredients_json) VALUES (?1, ?2, ?3)",
            params![recipe_title, recipe_id, serde_json::to_string(ingredients)?],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM cook_history WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(raw) => Ok(Some(Self::decode(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent entries first
    pub fn list(conn: &Connection, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM cook_history ORDER BY cooked_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_create_and_list_newest_first() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let ingredients = vec![IngredientRequirement::new("rice", 200.0, "g")];
        let first = CookHistoryEntry::create(&conn, "Fried Rice", None, &ingredients).unwrap();
        let second = CookHistoryEntry::create(&conn, "Rice Pudding", None, &ingredients).unwrap();

        let entries = CookHistoryEntry::list(&conn, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].id, first.id);
        assert_eq!(entries[1].ingredients, ingredients);
    }
}
