//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PANTRY ITEMS
        -- What is on hand in the kitchen
        -- ============================================
        CREATE TABLE pantry_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            quantity REAL NOT NULL CHECK(quantity >= 0),
            unit TEXT NOT NULL DEFAULT '',       -- free-form: "g", "cups", "cloves", ""
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_pantry_items_name ON pantry_items(name);

        -- ============================================
        -- SAVED RECIPES
        -- Suggested recipes the user kept
        -- ============================================
        CREATE TABLE saved_recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            ingredients_json TEXT NOT NULL DEFAULT '[]',
            instructions_json TEXT NOT NULL DEFAULT '[]',
            is_favorite INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_saved_recipes_favorite ON saved_recipes(is_favorite);

        -- ============================================
        -- COOK HISTORY
        -- Written in the same transaction as the pantry decrements
        -- ============================================
        CREATE TABLE cook_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_title TEXT NOT NULL,
            recipe_id INTEGER REFERENCES saved_recipes(id) ON DELETE SET NULL,
            ingredients_json TEXT NOT NULL DEFAULT '[]',
            cooked_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_cook_history_cooked_at ON cook_history(cooked_at);

        -- ============================================
        -- COMPLETED RACES
        -- ============================================
        CREATE TABLE completed_races (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            distance TEXT NOT NULL,              -- label: "5k", "1/2 marathon", "8 mile"
            time TEXT NOT NULL,                  -- "H:MM:SS", "M:SS" or seconds
            date TEXT NOT NULL,                  -- ISO date: "2025-04-12"
            notes TEXT,
            link TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_completed_races_date ON completed_races(date);
        CREATE INDEX idx_completed_races_distance ON completed_races(distance);

        -- ============================================
        -- UPCOMING RACES
        -- Removed when completed
        -- ============================================
        CREATE TABLE upcoming_races (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            distance TEXT NOT NULL,
            date TEXT NOT NULL,
            notes TEXT,
            link TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_upcoming_races_date ON upcoming_races(date);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_pantry_rejects_negative_quantity() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO pantry_items (name, quantity, unit) VALUES ('flour', -1, 'g')",
            [],
        );
        assert!(result.is_err());
    }
}
