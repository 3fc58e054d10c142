//! Completed Race model
//!
//! A finished race with its distance label, finishing time and date.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// A completed race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedRace {
    pub id: i64,
    pub name: String,
    /// Distance label as entered ("5k", "1/2 marathon", "8 mile")
    pub distance: String,
    /// Finishing time ("1:05:30", "23:30" or plain seconds)
    pub time: String,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub notes: Option<String>,
    pub link: Option<String>,
}

/// Data for logging a completed race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRaceCreate {
    pub name: String,
    pub distance: String,
    pub time: String,
    pub date: String,
    pub notes: Option<String>,
    pub link: Option<String>,
}

/// Data for editing a completed race
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletedRaceUpdate {
    pub name: Option<String>,
    pub distance: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub link: Option<String>,
}

impl CompletedRace {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            distance: row.get("distance")?,
            time: row.get("time")?,
            date: row.get("date")?,
            notes: row.get("notes")?,
            link: row.get("link")?,
        })
    }

    /// Log a completed race
    pub fn create(conn: &Connection, data: &CompletedRaceCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO completed_races (name, distance, time, date, notes, link)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![data.name, data.distance, data.time, data.date, data.notes, data.link],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM completed_races WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(race) => Ok(Some(race)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Full race history, most recent first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM completed_races ORDER BY date DESC, id DESC")?;
        let races = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(races)
    }

    /// Edit a completed race
    pub fn update(conn: &Connection, id: i64, data: &CompletedRaceUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        let fields = [
            ("name", &data.name),
            ("distance", &data.distance),
            ("time", &data.time),
            ("date", &data.date),
            ("notes", &data.notes),
            ("link", &data.link),
        ];
        for (column, value) in fields {
            if let Some(value) = value {
                updates.push(format!("{} = ?{}", column, params_vec.len() + 1));
                params_vec.push(Box::new(value.clone()));
            }
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE completed_races SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM completed_races WHERE id = ?1", [id])?;
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

    fn log(conn: &Connection, name: &str, date: &str) -> CompletedRace {
        CompletedRace::create(
            conn,
            &CompletedRaceCreate {
                name: name.to_string(),
                distance: "5k".to_string(),
                time: "25:00".to_string(),
                date: date.to_string(),
                notes: None,
                link: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_list_is_date_descending() {
        let conn = conn();
        log(&conn, "Spring 5k", "2024-04-01");
        log(&conn, "Turkey Trot", "2024-11-28");
        log(&conn, "New Year 5k", "2025-01-01");

        let names: Vec<_> = CompletedRace::list(&conn)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["New Year 5k", "Turkey Trot", "Spring 5k"]);
    }

    #[test]
    fn test_update_time_only() {
        let conn = conn();
        let race = log(&conn, "Park Run", "2025-03-08");

        let updated = CompletedRace::update(
            &conn,
            race.id,
            &CompletedRaceUpdate {
                time: Some("24:10".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.time, "24:10");
        assert_eq!(updated.name, "Park Run");
    }

    #[test]
    fn test_delete() {
        let conn = conn();
        let race = log(&conn, "Park Run", "2025-03-08");
        assert!(CompletedRace::delete(&conn, race.id).unwrap());
        assert!(CompletedRace::get_by_id(&conn, race.id).unwrap().is_none());
    }
}
