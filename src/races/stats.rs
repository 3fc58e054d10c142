//! Race statistics
//!
//! Per-period totals, per-distance bests and personal records. Everything is
//! recomputed from the race list on each call; nothing is cached between
//! calls.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::CompletedRace;
use super::distance::{distance_to_miles, standard_distance, STANDARD_DISTANCES};
use super::timing::{format_duration, format_pace, time_to_seconds};

/// Which races a statistics call covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearFilter {
    All,
    Year(i32),
}

impl YearFilter {
    /// Parse "All" (any case) or a four-digit year
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.eq_ignore_ascii_case("all time") {
            return Some(YearFilter::All);
        }
        trimmed.parse::<i32>().ok().map(YearFilter::Year)
    }

    pub fn includes(&self, race: &CompletedRace) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Year(year) => race_year(race) == Some(*year),
        }
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => write!(f, "All"),
            YearFilter::Year(year) => write!(f, "{}", year),
        }
    }
}

fn race_year(race: &CompletedRace) -> Option<i32> {
    NaiveDate::parse_from_str(race.date.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

/// Bucket key for a distance label: the canonical label for standard
/// distances, otherwise the trimmed label as entered
///
/// Standard aliases ("5K", "half marathon") share one bucket so a race logged
/// as "5K" counts toward the "5k" record. Other labels are never merged.
pub fn distance_key(label: &str) -> String {
    standard_distance(label)
        .map(str::to_string)
        .unwrap_or_else(|| label.trim().to_string())
}

/// Fastest race for one distance
#[derive(Debug, Clone, Serialize)]
pub struct PersonalRecord {
    pub distance: String,
    pub race: Option<CompletedRace>,
    pub time_seconds: Option<f64>,
    pub pace: Option<String>,
}

/// Statistics for one distance within a period
#[derive(Debug, Clone, Serialize)]
pub struct DistanceStats {
    pub distance: String,
    pub race_count: usize,
    pub best_time: Option<String>,
    pub best_race_id: Option<i64>,
    /// Seconds between the slowest and fastest race; only when positive
    pub improvement_seconds: Option<f64>,
    pub improvement: Option<String>,
    /// Most recent first
    pub races: Vec<CompletedRace>,
}

/// Statistics for a period
#[derive(Debug, Clone, Serialize)]
pub struct YearStats {
    pub period: String,
    pub race_count: usize,
    pub total_miles: f64,
    pub total_seconds: f64,
    pub total_time: String,
    pub average_pace: Option<String>,
    pub distances: Vec<DistanceStats>,
    /// Across the whole history, not just the period
    pub personal_records: Vec<PersonalRecord>,
}

/// Date descending, newest id first on equal dates
fn by_date_desc(a: &CompletedRace, b: &CompletedRace) -> Ordering {
    b.date.cmp(&a.date).then(b.id.cmp(&a.id))
}

/// Fastest race with a parseable time; ties go to the earlier race
fn fastest<'a, I>(races: I) -> Option<(&'a CompletedRace, f64)>
where
    I: IntoIterator<Item = &'a CompletedRace>,
{
    races
        .into_iter()
        .filter_map(|race| time_to_seconds(&race.time).map(|secs| (race, secs)))
        .min_by(|(ra, a), (rb, b)| {
            a.partial_cmp(b)
                .unwrap_or(Ordering::Equal)
                .then(ra.date.cmp(&rb.date))
                .then(ra.id.cmp(&rb.id))
        })
}

/// Group races by distance key: standard distances first (present even when
/// empty), then other labels alphabetically
fn group_by_distance<'a>(races: &[&'a CompletedRace]) -> Vec<(String, Vec<&'a CompletedRace>)> {
    let mut others: BTreeMap<String, Vec<&'a CompletedRace>> = BTreeMap::new();
    let mut standard: Vec<(String, Vec<&'a CompletedRace>)> = STANDARD_DISTANCES
        .iter()
        .map(|label| (label.to_string(), Vec::new()))
        .collect();

    for &race in races {
        let key = distance_key(&race.distance);
        match standard.iter_mut().find(|(label, _)| *label == key) {
            Some((_, bucket)) => bucket.push(race),
            None => others.entry(key).or_default().push(race),
        }
    }

    standard.extend(others);
    standard
}

fn distance_stats(distance: String, mut races: Vec<&CompletedRace>) -> DistanceStats {
    races.sort_by(|a, b| by_date_desc(a, b));

    let best = fastest(races.iter().copied());
    let slowest = races
        .iter()
        .filter_map(|race| time_to_seconds(&race.time))
        .fold(None, |acc: Option<f64>, secs| Some(acc.map_or(secs, |m| m.max(secs))));

    let improvement_seconds = match (best, slowest) {
        (Some((_, best_secs)), Some(worst_secs)) if races.len() > 1 => {
            Some(worst_secs - best_secs).filter(|gap| *gap > 0.0)
        }
        _ => None,
    };

    DistanceStats {
        distance,
        race_count: races.len(),
        best_time: best.map(|(race, _)| race.time.clone()),
        best_race_id: best.map(|(race, _)| race.id),
        improvement_seconds,
        improvement: improvement_seconds.map(format_duration),
        races: races.into_iter().cloned().collect(),
    }
}

/// Personal record per distance over the whole history
pub fn personal_records(races: &[CompletedRace]) -> Vec<PersonalRecord> {
    let all: Vec<&CompletedRace> = races.iter().collect();

    group_by_distance(&all)
        .into_iter()
        .map(|(distance, bucket)| {
            let best = fastest(bucket);
            PersonalRecord {
                pace: best.and_then(|(race, secs)| format_pace(secs, distance_to_miles(&race.distance))),
                time_seconds: best.map(|(_, secs)| secs),
                race: best.map(|(race, _)| race.clone()),
                distance,
            }
        })
        .collect()
}

/// Totals, per-distance statistics and personal records for a period
pub fn compute_statistics(races: &[CompletedRace], filter: YearFilter) -> YearStats {
    let selected: Vec<&CompletedRace> = races.iter().filter(|race| filter.includes(race)).collect();

    let total_miles: f64 = selected.iter().map(|race| distance_to_miles(&race.distance)).sum();
    let total_seconds: f64 = selected
        .iter()
        .map(|race| time_to_seconds(&race.time).unwrap_or(0.0))
        .sum();

    let distances = group_by_distance(&selected)
        .into_iter()
        .map(|(distance, bucket)| distance_stats(distance, bucket))
        .collect();

    YearStats {
        period: filter.to_string(),
        race_count: selected.len(),
        total_miles,
        total_seconds,
        total_time: format_duration(total_seconds),
        average_pace: format_pace(total_seconds, total_miles),
        distances,
        personal_records: personal_records(races),
    }
}

/// Years that have at least one race, newest first
pub fn available_years(races: &[CompletedRace]) -> Vec<i32> {
    let mut years: Vec<i32> = races.iter().filter_map(race_year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// Current record for a distance, if any race at that distance has a time
pub fn current_record<'a>(history: &'a [CompletedRace], distance: &str) -> Option<&'a CompletedRace> {
    let key = distance_key(distance);
    fastest(history.iter().filter(|race| distance_key(&race.distance) == key)).map(|(race, _)| race)
}

/// Whether a newly finished time is a personal record worth celebrating
///
/// Only the standard distances qualify. The new time must be strictly faster
/// than the current record, or there must be no record yet.
pub fn is_new_personal_record(history: &[CompletedRace], distance: &str, time: &str) -> bool {
    if standard_distance(distance).is_none() {
        return false;
    }
    let new_seconds = match time_to_seconds(time) {
        Some(secs) => secs,
        None => return false,
    };

    match current_record(history, distance).and_then(|race| time_to_seconds(&race.time)) {
        Some(record_seconds) => new_seconds < record_seconds,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race(id: i64, distance: &str, time: &str, date: &str) -> CompletedRace {
        CompletedRace {
            id,
            name: format!("Race {}", id),
            distance: distance.to_string(),
            time: time.to_string(),
            date: date.to_string(),
            notes: None,
            link: None,
        }
    }

    fn bucket<'a>(stats: &'a YearStats, distance: &str) -> &'a DistanceStats {
        stats
            .distances
            .iter()
            .find(|d| d.distance == distance)
            .unwrap()
    }

    #[test]
    fn test_five_k_record_and_improvement() {
        let races = vec![
            race(1, "5k", "25:00", "2025-03-01"),
            race(2, "5k", "23:30", "2025-09-14"),
        ];

        let stats = compute_statistics(&races, YearFilter::Year(2025));
        let five_k = bucket(&stats, "5k");
        assert_eq!(five_k.best_race_id, Some(2));
        assert_eq!(five_k.best_time.as_deref(), Some("23:30"));
        assert_eq!(five_k.improvement_seconds, Some(90.0));
        assert_eq!(five_k.improvement.as_deref(), Some("1:30"));

        let records = personal_records(&races);
        let record = records.iter().find(|r| r.distance == "5k").unwrap();
        assert_eq!(record.race.as_ref().map(|r| r.id), Some(2));
    }

    #[test]
    fn test_year_filter_and_totals() {
        let races = vec![
            race(1, "10k", "1:05:30", "2024-05-01"),
            race(2, "5k", "25:00", "2025-03-01"),
            race(3, "5k", "24:00", "2025-06-01"),
        ];

        let stats = compute_statistics(&races, YearFilter::Year(2024));
        assert_eq!(stats.period, "2024");
        assert_eq!(stats.race_count, 1);
        assert!((stats.total_miles - 6.21371).abs() < 1e-9);
        assert_eq!(stats.total_seconds, 3930.0);
        assert_eq!(stats.total_time, "1:05:30");
        assert_eq!(stats.average_pace.as_deref(), Some("10:32/mi"));

        let all = compute_statistics(&races, YearFilter::All);
        assert_eq!(all.period, "All");
        assert_eq!(all.race_count, 3);
        assert_eq!(all.total_seconds, 3930.0 + 1500.0 + 1440.0);
    }

    #[test]
    fn test_standard_distances_always_present() {
        let races = vec![race(1, "8 mile", "1:04:00", "2025-02-01")];
        let stats = compute_statistics(&races, YearFilter::All);

        let labels: Vec<&str> = stats.distances.iter().map(|d| d.distance.as_str()).collect();
        assert_eq!(labels, vec!["5k", "10k", "1/2 marathon", "marathon", "8 mile"]);

        let marathon = bucket(&stats, "marathon");
        assert_eq!(marathon.race_count, 0);
        assert_eq!(marathon.best_time, None);
        assert_eq!(marathon.improvement, None);
    }

    #[test]
    fn test_personal_records_ignore_year_filter() {
        let races = vec![
            race(1, "5k", "22:00", "2023-04-01"),
            race(2, "5k", "24:00", "2025-04-01"),
        ];

        let stats = compute_statistics(&races, YearFilter::Year(2025));
        assert_eq!(bucket(&stats, "5k").best_race_id, Some(2));

        let record = stats.personal_records.iter().find(|r| r.distance == "5k").unwrap();
        assert_eq!(record.race.as_ref().map(|r| r.id), Some(1));
    }

    #[test]
    fn test_single_race_has_no_improvement() {
        let races = vec![race(1, "10k", "50:00", "2025-04-01")];
        let stats = compute_statistics(&races, YearFilter::All);
        let ten_k = bucket(&stats, "10k");
        assert_eq!(ten_k.race_count, 1);
        assert_eq!(ten_k.improvement_seconds, None);
    }

    #[test]
    fn test_equal_times_have_no_improvement() {
        let races = vec![
            race(1, "10k", "50:00", "2025-04-01"),
            race(2, "10k", "50:00", "2025-05-01"),
        ];
        let stats = compute_statistics(&races, YearFilter::All);
        assert_eq!(bucket(&stats, "10k").improvement, None);
    }

    #[test]
    fn test_bucket_races_sorted_newest_first() {
        let races = vec![
            race(1, "5k", "25:00", "2025-01-01"),
            race(2, "5k", "24:00", "2025-08-01"),
            race(3, "5k", "26:00", "2025-04-01"),
        ];
        let stats = compute_statistics(&races, YearFilter::All);
        let ids: Vec<i64> = bucket(&stats, "5k").races.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_standard_aliases_share_a_bucket() {
        let races = vec![
            race(1, "5K", "25:00", "2025-01-01"),
            race(2, "5k", "24:00", "2025-08-01"),
            race(3, "Half Marathon", "1:55:00", "2025-10-01"),
        ];
        let stats = compute_statistics(&races, YearFilter::All);
        assert_eq!(bucket(&stats, "5k").race_count, 2);
        assert_eq!(bucket(&stats, "1/2 marathon").race_count, 1);
        assert_eq!(stats.distances.len(), 4);
    }

    #[test]
    fn test_empty_history() {
        let stats = compute_statistics(&[], YearFilter::All);
        assert_eq!(stats.race_count, 0);
        assert_eq!(stats.total_time, "0:00");
        assert_eq!(stats.average_pace, None);
        assert_eq!(stats.personal_records.len(), 4);
        assert!(stats.personal_records.iter().all(|r| r.race.is_none()));
    }

    #[test]
    fn test_new_personal_record_detection() {
        let history = vec![race(1, "5k", "24:00", "2025-01-01")];

        assert!(is_new_personal_record(&history, "5k", "23:59"));
        assert!(!is_new_personal_record(&history, "5k", "24:00"));
        assert!(!is_new_personal_record(&history, "5k", "24:30"));
        // no record yet at this standard distance
        assert!(is_new_personal_record(&history, "10k", "55:00"));
        // non-standard distances never count
        assert!(!is_new_personal_record(&[], "8 mile", "1:00:00"));
        // unparseable time
        assert!(!is_new_personal_record(&history, "5k", "soon"));
    }

    #[test]
    fn test_year_filter_parse() {
        assert_eq!(YearFilter::parse("All"), Some(YearFilter::All));
        assert_eq!(YearFilter::parse("all time"), Some(YearFilter::All));
        assert_eq!(YearFilter::parse("2024"), Some(YearFilter::Year(2024)));
        assert_eq!(YearFilter::parse("last year"), None);
    }

    #[test]
    fn test_available_years() {
        let races = vec![
            race(1, "5k", "25:00", "2023-01-01"),
            race(2, "5k", "24:00", "2025-08-01"),
            race(3, "5k", "26:00", "2025-04-01"),
            race(4, "5k", "26:00", "someday"),
        ];
        assert_eq!(available_years(&races), vec![2025, 2023]);
    }
}
