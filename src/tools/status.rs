//! Home Log Status Tool
//!
//! Provides runtime status information and usage instructions.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Pantry and cooking instructions for AI assistants
pub const PANTRY_INSTRUCTIONS: &str = r#"
# Home Log Pantry Instructions

## Units

Pantry items and recipe ingredients carry a quantity and a unit. Known units
are converted to a base unit before anything is compared:

| Kind | Units | Base |
|------|-------|------|
| Mass | mg, g, kg, oz, lb, stick | g |
| Volume | ml, l, tsp, tbsp, cup, fl oz, pint, quart, gallon | ml |

Plurals and common abbreviations work ("cups", "tbsp", "lbs"). Grams and
milliliters are treated as interchangeable (water density), so a recipe can
ask for "2 cups" of flour stored in grams.

Countable things (eggs, lemons) use an empty unit. Any unit not in the table
is compared by its raw number only, so keep the pantry and the recipe on the
same unit for those items.

## Matching

Ingredients are matched to pantry items by name, case-insensitively: an exact
name wins, otherwise the first pantry item whose name contains the ingredient
(or is contained in it). Use plain names ("flour", not "2 cups of flour").

## Cooking

1. `check_recipe` tells you whether the pantry covers a recipe. Nothing changes.
2. `cook_recipe` subtracts every ingredient and records the meal in the cook
   history. Items that run out are removed from the pantry.
3. If anything is missing or short, cooking is blocked and the pantry is left
   exactly as it was. The response names the first problem found.

## Suggestions

`suggest_recipe` asks a language model for a recipe built from the pantry.
The suggestion comes back already checked against the pantry; save it with
`save_recipe` if it is worth keeping.
"#;

/// Race log instructions for AI assistants
pub const RACE_INSTRUCTIONS: &str = r#"
# Home Log Race Instructions

## Logging

- Dates are `YYYY-MM-DD`.
- Times are `H:MM:SS`, `M:SS` or plain seconds.
- Distances are free text. Use "5k", "10k", "1/2 marathon" or "marathon" for
  the standard distances; other labels like "8 mile" or "15k" are converted to
  miles for totals and pace.

## Upcoming races

Add planned races with `add_upcoming_race`. Once run, call
`complete_upcoming_race` with the finishing time: the race moves to the log
and the response says whether it set a personal record.

## Statistics

- `race_statistics` with a year (e.g. "2024") or "All".
- `personal_records` lists the best time for every logged distance; the
  four standard distances always appear, even without a race.
- `available_years` lists the years that have races.
"#;

/// Runtime status information
#[derive(Debug, Clone, Serialize)]
pub struct HomelogStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub build_profile: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,

    /// Whether recipe suggestions are configured
    pub suggestions_enabled: bool,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    suggestions_enabled: bool,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, suggestions_enabled: bool) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            suggestions_enabled,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> HomelogStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        HomelogStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            build_profile: build_info.profile,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            suggestions_enabled: self.suggestions_enabled,
        }
    }
}
