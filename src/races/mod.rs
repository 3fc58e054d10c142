//! Race statistics module
//!
//! Distance and time parsing plus the statistics computed over the race log.

pub mod distance;
pub mod stats;
pub mod timing;

pub use distance::{distance_to_miles, standard_distance, STANDARD_DISTANCES};
pub use stats::{
    available_years, compute_statistics, current_record, is_new_personal_record,
    personal_records, DistanceStats, PersonalRecord, YearFilter, YearStats,
};
pub use timing::{format_duration, format_pace, time_to_seconds};
