//! Pantry Item model
//!
//! Represents something on hand in the kitchen with its quantity and unit.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::measure::Quantity;

/// A pantry item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    pub id: i64,
    pub name: String,
    pub quantity: Quantity,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for adding a pantry item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PantryItemCreate {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

/// Data for editing a pantry item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PantryItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl PantryItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            quantity: Quantity {
                amount: row.get("quantity")?,
                unit: row.get("unit")?,
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Add a new item to the pantry
    pub fn create(conn: &Connection, data: &PantryItemCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO pantry_items (name, quantity, unit) VALUES (?1, ?2, ?3)",
            params![data.name, data.quantity, data.unit],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a pantry item by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM pantry_items WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot of the whole pantry, in insertion order
    ///
    /// Ingredient resolution takes the first substring match, so the order
    /// returned here is the order that heuristic sees.
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM pantry_items ORDER BY id")?;
        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Search pantry items by name
    pub fn search(conn: &Connection, query: &str) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = conn.prepare(
            "SELECT * FROM pantry_items WHERE name LIKE ?1 COLLATE NOCASE ORDER BY name",
        )?;
        let items = stmt
            .query_map([pattern], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Edit a pantry item
    pub fn update(conn: &Connection, id: i64, data: &PantryItemUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(quantity) = data.quantity {
            updates.push(format!("quantity = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(quantity));
        }
        if let Some(ref unit) = data.unit {
            updates.push(format!("unit = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(unit.clone()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE pantry_items SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Set the remaining quantity after consumption
    pub fn set_quantity(conn: &Connection, id: i64, quantity: f64) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE pantry_items SET quantity = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![quantity, id],
        )?;
        Ok(rows > 0)
    }

    /// Delete a pantry item
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM pantry_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
