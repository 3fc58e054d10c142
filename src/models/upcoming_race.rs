//! Upcoming Race model
//!
//! A race the user has signed up for. Completing it turns it into a
//! `CompletedRace`; there is no way back.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::{CompletedRace, CompletedRaceCreate};

/// An upcoming race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingRace {
    pub id: i64,
    pub name: String,
    pub distance: String,
    pub date: String,
    pub notes: Option<String>,
    pub link: Option<String>,
}

/// Data for adding an upcoming race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingRaceCreate {
    pub name: String,
    pub distance: String,
    pub date: String,
    pub notes: Option<String>,
    pub link: Option<String>,
}

impl UpcomingRace {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            distance: row.get("distance")?,
            date: row.get("date")?,
            notes: row.get("notes")?,
            link: row.get("link")?,
        })
    }

    pub fn create(conn: &Connection, data: &UpcomingRaceCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO upcoming_races (name, distance, date, notes, link) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![data.name, data.distance, data.date, data.notes, data.link],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM upcoming_races WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(race) => Ok(Some(race)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Soonest first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM upcoming_races ORDER BY date ASC, id ASC")?;
        let races = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(races)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM upcoming_races WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Move this race into the completed log
    ///
    /// Inserts the completed race and removes the upcoming entry. Callers run
    /// this inside a transaction so both writes land together.
    pub fn complete(
        conn: &Connection,
        id: i64,
        time: &str,
        notes: Option<String>,
    ) -> DbResult<Option<CompletedRace>> {
        let upcoming = match Self::get_by_id(conn, id)? {
            Some(race) => race,
            None => return Ok(None),
        };

        let completed = CompletedRace::create(
            conn,
            &CompletedRaceCreate {
                name: upcoming.name,
                distance: upcoming.distance,
                time: time.to_string(),
                date: upcoming.date,
                notes: notes.or(upcoming.notes),
                link: upcoming.link,
            },
        )?;
        Self::delete(conn, id)?;

        Ok(Some(completed))
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

    fn add(conn: &Connection, name: &str, date: &str) -> UpcomingRace {
        UpcomingRace::create(
            conn,
            &UpcomingRaceCreate {
                name: name.to_string(),
                distance: "10k".to_string(),
                date: date.to_string(),
                notes: Some("goal: sub 50".to_string()),
                link: Some("https://example.com/race".to_string()),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_list_soonest_first() {
        let conn = conn();
        add(&conn, "Autumn 10k", "2026-10-01");
        add(&conn, "Summer 10k", "2026-07-01");

        let races = UpcomingRace::list(&conn).unwrap();
        assert_eq!(races[0].name, "Summer 10k");
        assert_eq!(races[1].name, "Autumn 10k");
    }

    #[test]
    fn test_complete_moves_race() {
        let conn = conn();
        let upcoming = add(&conn, "City 10k", "2026-05-03");

        let completed = UpcomingRace::complete(&conn, upcoming.id, "49:12", None)
            .unwrap()
            .unwrap();

        assert_eq!(completed.name, "City 10k");
        assert_eq!(completed.distance, "10k");
        assert_eq!(completed.time, "49:12");
        assert_eq!(completed.date, "2026-05-03");
        assert_eq!(completed.notes.as_deref(), Some("goal: sub 50"));
        assert!(UpcomingRace::get_by_id(&conn, upcoming.id).unwrap().is_none());
        assert_eq!(CompletedRace::list(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_complete_missing_race() {
        let conn = conn();
        assert!(UpcomingRace::complete(&conn, 7, "20:00", None).unwrap().is_none());
        assert!(CompletedRace::list(&conn).unwrap().is_empty());
    }
}
