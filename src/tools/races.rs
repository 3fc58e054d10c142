//! Race MCP Tools
//!
//! Tools for the race log, upcoming races and race statistics.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::{Database, DbResult};
use crate::models::{
    CompletedRace, CompletedRaceCreate, CompletedRaceUpdate, UpcomingRace, UpcomingRaceCreate,
};
use crate::races::{
    self, compute_statistics, current_record, is_new_personal_record, time_to_seconds,
    PersonalRecord, YearFilter, YearStats,
};

/// Response for log_race and complete_upcoming_race
#[derive(Debug, Serialize)]
pub struct LoggedRaceResponse {
    pub race: CompletedRace,
    pub is_personal_record: bool,
    /// Record this race beat, if there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_record: Option<CompletedRace>,
}

/// Response for list_races
#[derive(Debug, Serialize)]
pub struct ListRacesResponse {
    pub races: Vec<CompletedRace>,
    pub total: usize,
    pub year: String,
}

/// Response for list_upcoming_races
#[derive(Debug, Serialize)]
pub struct ListUpcomingRacesResponse {
    pub races: Vec<UpcomingRace>,
    pub total: usize,
}

/// Response for delete_race and delete_upcoming_race
#[derive(Debug, Serialize)]
pub struct DeleteRaceResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for personal_records
#[derive(Debug, Serialize)]
pub struct PersonalRecordsResponse {
    pub records: Vec<PersonalRecord>,
}

/// Response for available_years
#[derive(Debug, Serialize)]
pub struct AvailableYearsResponse {
    pub years: Vec<i32>,
}

fn validate_date(date: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", date))
}

fn validate_time(time: &str) -> Result<(), String> {
    time_to_seconds(time)
        .map(|_| ())
        .ok_or_else(|| format!("Invalid time '{}', expected H:MM:SS or M:SS", time))
}

fn require(value: &str, field: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(trimmed.to_string())
}

fn parse_year(year: Option<&str>) -> Result<YearFilter, String> {
    match year {
        None => Ok(YearFilter::All),
        Some(year) => YearFilter::parse(year)
            .ok_or_else(|| format!("Invalid year '{}', expected a year or \"All\"", year)),
    }
}

/// Personal-record check against the log, done before the new race is inserted
fn record_check(
    conn: &rusqlite::Connection,
    distance: &str,
    time: &str,
) -> DbResult<(bool, Option<CompletedRace>)> {
    let history = CompletedRace::list(conn)?;
    let is_record = is_new_personal_record(&history, distance, time);
    let previous = if is_record {
        current_record(&history, distance).cloned()
    } else {
        None
    };
    Ok((is_record, previous))
}

/// Log a finished race
pub fn log_race(db: &Database, data: CompletedRaceCreate) -> Result<LoggedRaceResponse, String> {
    validate_time(&data.time)?;
    validate_date(&data.date)?;

    let data = CompletedRaceCreate {
        name: require(&data.name, "Race name")?,
        distance: require(&data.distance, "Distance")?,
        time: data.time.trim().to_string(),
        date: data.date.trim().to_string(),
        ..data
    };

    let (race, is_personal_record, previous_record) = db
        .with_transaction(|tx| {
            let (is_record, previous) = record_check(tx, &data.distance, &data.time)?;
            let race = CompletedRace::create(tx, &data)?;
            Ok((race, is_record, previous))
        })
        .map_err(|e: crate::db::DbError| format!("Failed to log race: {}", e))?;

    tracing::info!(
        "Logged race '{}' ({} in {}){}",
        race.name,
        race.distance,
        race.time,
        if is_personal_record { ", new personal record" } else { "" }
    );

    Ok(LoggedRaceResponse {
        race,
        is_personal_record,
        previous_record,
    })
}

/// Get a completed race by ID
pub fn get_race(db: &Database, id: i64) -> Result<Option<CompletedRace>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    CompletedRace::get_by_id(&conn, id).map_err(|e| format!("Failed to get race: {}", e))
}

/// List completed races, newest first, optionally for one year
pub fn list_races(db: &Database, year: Option<&str>) -> Result<ListRacesResponse, String> {
    let filter = parse_year(year)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let races: Vec<CompletedRace> = CompletedRace::list(&conn)
        .map_err(|e| format!("Failed to list races: {}", e))?
        .into_iter()
        .filter(|race| filter.includes(race))
        .collect();
    let total = races.len();

    Ok(ListRacesResponse {
        races,
        total,
        year: filter.to_string(),
    })
}

/// Edit a completed race
pub fn update_race(db: &Database, id: i64, data: CompletedRaceUpdate) -> Result<CompletedRace, String> {
    if let Some(time) = &data.time {
        validate_time(time)?;
    }
    if let Some(date) = &data.date {
        validate_date(date)?;
    }

    let data = CompletedRaceUpdate {
        name: data.name.as_deref().map(|n| require(n, "Race name")).transpose()?,
        distance: data.distance.as_deref().map(|d| require(d, "Distance")).transpose()?,
        time: data.time.map(|t| t.trim().to_string()),
        date: data.date.map(|d| d.trim().to_string()),
        ..data
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    CompletedRace::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update race: {}", e))?
        .ok_or_else(|| format!("Race not found with id: {}", id))
}

/// Delete a completed race
pub fn delete_race(db: &Database, id: i64) -> Result<DeleteRaceResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = CompletedRace::delete(&conn, id)
        .map_err(|e| format!("Failed to delete race: {}", e))?;

    if !deleted {
        return Err(format!("Race not found with id: {}", id));
    }

    Ok(DeleteRaceResponse {
        success: true,
        deleted_id: id,
    })
}

/// Add a race to the calendar
pub fn add_upcoming_race(db: &Database, data: UpcomingRaceCreate) -> Result<UpcomingRace, String> {
    validate_date(&data.date)?;

    let data = UpcomingRaceCreate {
        name: require(&data.name, "Race name")?,
        distance: require(&data.distance, "Distance")?,
        date: data.date.trim().to_string(),
        ..data
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let race = UpcomingRace::create(&conn, &data)
        .map_err(|e| format!("Failed to add upcoming race: {}", e))?;

    tracing::info!("Added upcoming race '{}' on {}", race.name, race.date);
    Ok(race)
}

/// List upcoming races, soonest first
pub fn list_upcoming_races(db: &Database) -> Result<ListUpcomingRacesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let races = UpcomingRace::list(&conn)
        .map_err(|e| format!("Failed to list upcoming races: {}", e))?;
    let total = races.len();

    Ok(ListUpcomingRacesResponse { races, total })
}

/// Remove a race from the calendar without logging it
pub fn delete_upcoming_race(db: &Database, id: i64) -> Result<DeleteRaceResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = UpcomingRace::delete(&conn, id)
        .map_err(|e| format!("Failed to delete upcoming race: {}", e))?;

    if !deleted {
        return Err(format!("Upcoming race not found with id: {}", id));
    }

    Ok(DeleteRaceResponse {
        success: true,
        deleted_id: id,
    })
}

/// Record the finishing time of an upcoming race and move it to the log
///
/// The insert into the log and the removal from the calendar happen in one
/// transaction.
pub fn complete_upcoming_race(
    db: &Database,
    id: i64,
    time: &str,
    notes: Option<String>,
) -> Result<LoggedRaceResponse, String> {
    validate_time(time)?;
    let time = time.trim();

    let completed = db
        .with_transaction(|tx| {
            let upcoming = match UpcomingRace::get_by_id(tx, id)? {
                Some(race) => race,
                None => return Ok(None),
            };
            let (is_record, previous) = record_check(tx, &upcoming.distance, time)?;
            let race = UpcomingRace::complete(tx, id, time, notes)?;
            Ok(race.map(|race| (race, is_record, previous)))
        })
        .map_err(|e: crate::db::DbError| format!("Failed to complete race: {}", e))?;

    let (race, is_personal_record, previous_record) =
        completed.ok_or_else(|| format!("Upcoming race not found with id: {}", id))?;

    tracing::info!(
        "Completed race '{}' in {}{}",
        race.name,
        race.time,
        if is_personal_record { ", new personal record" } else { "" }
    );

    Ok(LoggedRaceResponse {
        race,
        is_personal_record,
        previous_record,
    })
}

/// Statistics for one year, or all time when no year is given
pub fn race_statistics(db: &Database, year: Option<&str>) -> Result<YearStats, String> {
    let filter = parse_year(year)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let history = CompletedRace::list(&conn)
        .map_err(|e| format!("Failed to list races: {}", e))?;

    Ok(compute_statistics(&history, filter))
}

/// Best time for every logged distance label, plus the standard distances
pub fn personal_records(db: &Database) -> Result<PersonalRecordsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let history = CompletedRace::list(&conn)
        .map_err(|e| format!("Failed to list races: {}", e))?;

    Ok(PersonalRecordsResponse {
        records: races::personal_records(&history),
    })
}

/// Years with at least one logged race
pub fn available_years(db: &Database) -> Result<AvailableYearsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let history = CompletedRace::list(&conn)
        .map_err(|e| format!("Failed to list races: {}", e))?;

    Ok(AvailableYearsResponse {
        years: races::available_years(&history),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn race(name: &str, distance: &str, time: &str, date: &str) -> CompletedRaceCreate {
        CompletedRaceCreate {
            name: name.to_string(),
            distance: distance.to_string(),
            time: time.to_string(),
            date: date.to_string(),
            notes: None,
            link: None,
        }
    }

    fn upcoming(name: &str, distance: &str, date: &str) -> UpcomingRaceCreate {
        UpcomingRaceCreate {
            name: name.to_string(),
            distance: distance.to_string(),
            date: date.to_string(),
            notes: None,
            link: None,
        }
    }

    #[test]
    fn test_log_race_validates() {
        let db = test_db();
        assert!(log_race(&db, race("Turkey Trot", "5k", "fast", "2024-11-28")).is_err());
        assert!(log_race(&db, race("Turkey Trot", "5k", "25:00", "Nov 28")).is_err());
        assert!(log_race(&db, race(" ", "5k", "25:00", "2024-11-28")).is_err());
    }

    #[test]
    fn test_log_race_detects_records() {
        let db = test_db();
        let first = log_race(&db, race("Spring 5K", "5k", "25:00", "2024-04-01")).unwrap();
        assert!(first.is_personal_record);
        assert!(first.previous_record.is_none());

        let slower = log_race(&db, race("Summer 5K", "5K", "26:00", "2024-07-01")).unwrap();
        assert!(!slower.is_personal_record);

        let faster = log_race(&db, race("Fall 5K", "5k", "24:10", "2024-10-01")).unwrap();
        assert!(faster.is_personal_record);
        assert_eq!(faster.previous_record.map(|r| r.id), Some(first.race.id));

        let other = log_race(&db, race("Trail run", "8 mile", "1:10:00", "2024-10-05")).unwrap();
        assert!(!other.is_personal_record);
    }

    #[test]
    fn test_list_races_by_year() {
        let db = test_db();
        log_race(&db, race("A", "5k", "25:00", "2023-05-01")).unwrap();
        log_race(&db, race("B", "10k", "52:00", "2024-05-01")).unwrap();
        log_race(&db, race("C", "5k", "24:00", "2024-09-01")).unwrap();

        let all = list_races(&db, None).unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.races[0].name, "C");
        assert_eq!(all.year, "All");

        let year = list_races(&db, Some("2024")).unwrap();
        assert_eq!(year.total, 2);
        assert!(list_races(&db, Some("last year")).is_err());

        assert_eq!(available_years(&db).unwrap().years, vec![2024, 2023]);
    }

    #[test]
    fn test_update_and_delete_race() {
        let db = test_db();
        let id = log_race(&db, race("A", "5k", "25:00", "2024-05-01")).unwrap().race.id;

        let updated = update_race(
            &db,
            id,
            CompletedRaceUpdate {
                time: Some("24:30".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.time, "24:30");

        assert!(update_race(
            &db,
            id,
            CompletedRaceUpdate {
                time: Some("soon".to_string()),
                ..Default::default()
            }
        )
        .is_err());

        assert!(delete_race(&db, id).unwrap().success);
        assert!(get_race(&db, id).unwrap().is_none());
        assert!(delete_race(&db, id).is_err());
    }

    #[test]
    fn test_complete_upcoming_race_moves_it() {
        let db = test_db();
        log_race(&db, race("Old 10K", "10k", "55:00", "2023-06-01")).unwrap();
        let planned = add_upcoming_race(&db, upcoming("City 10K", "10K", "2024-06-01")).unwrap();

        let done = complete_upcoming_race(&db, planned.id, "52:30", Some("Windy".to_string())).unwrap();
        assert!(done.is_personal_record);
        assert_eq!(done.race.name, "City 10K");
        assert_eq!(done.race.date, "2024-06-01");
        assert_eq!(done.race.notes.as_deref(), Some("Windy"));

        assert_eq!(list_upcoming_races(&db).unwrap().total, 0);
        assert_eq!(list_races(&db, None).unwrap().total, 2);
        assert!(complete_upcoming_race(&db, planned.id, "52:30", None).is_err());
    }

    #[test]
    fn test_complete_with_bad_time_keeps_upcoming() {
        let db = test_db();
        let planned = add_upcoming_race(&db, upcoming("Marathon", "marathon", "2025-10-12")).unwrap();

        assert!(complete_upcoming_race(&db, planned.id, "", None).is_err());
        assert_eq!(list_upcoming_races(&db).unwrap().total, 1);
        assert_eq!(list_races(&db, None).unwrap().total, 0);
    }

    #[test]
    fn test_upcoming_races_sorted_soonest_first() {
        let db = test_db();
        add_upcoming_race(&db, upcoming("Later", "5k", "2025-09-01")).unwrap();
        add_upcoming_race(&db, upcoming("Sooner", "10k", "2025-03-01")).unwrap();
        assert!(add_upcoming_race(&db, upcoming("Bad", "5k", "someday")).is_err());

        let listed = list_upcoming_races(&db).unwrap();
        assert_eq!(listed.races[0].name, "Sooner");

        assert!(delete_upcoming_race(&db, listed.races[0].id).unwrap().success);
        assert_eq!(list_upcoming_races(&db).unwrap().total, 1);
    }

    #[test]
    fn test_race_statistics_and_records() {
        let db = test_db();
        log_race(&db, race("A", "5k", "25:00", "2024-04-01")).unwrap();
        log_race(&db, race("B", "5k", "24:00", "2024-10-01")).unwrap();
        log_race(&db, race("C", "10k", "1:05:30", "2023-05-01")).unwrap();

        let stats = race_statistics(&db, Some("2024")).unwrap();
        assert_eq!(stats.race_count, 2);
        assert_eq!(stats.total_time, "49:00");

        let all = race_statistics(&db, Some("All")).unwrap();
        assert_eq!(all.race_count, 3);

        let records = personal_records(&db).unwrap().records;
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].distance, "5k");
        assert_eq!(records[0].race.as_ref().map(|r| r.name.as_str()), Some("B"));
        assert!(records[2].race.is_none());
    }

    #[test]
    fn test_personal_records_include_custom_labels() {
        let db = test_db();
        log_race(&db, race("Turkey Trot", "8 mile", "1:02:00", "2024-11-28")).unwrap();
        log_race(&db, race("Parkrun", "5K", "23:10", "2024-06-01")).unwrap();

        let records = personal_records(&db).unwrap().records;
        assert_eq!(records.len(), 5);
        let custom = records.iter().find(|r| r.distance == "8 mile").unwrap();
        assert_eq!(custom.race.as_ref().map(|r| r.name.as_str()), Some("Turkey Trot"));
        let five_k = records.iter().find(|r| r.distance == "5k").unwrap();
        assert_eq!(five_k.race.as_ref().map(|r| r.name.as_str()), Some("Parkrun"));
    }
}
