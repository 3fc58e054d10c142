//! Race time parsing and formatting

/// Parse a race time into seconds
///
/// Accepts "H:MM:SS", "M:SS" or plain seconds. Returns None for empty or
/// malformed input.
pub fn time_to_seconds(time: &str) -> Option<f64> {
    let trimmed = time.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut total = 0.0;
    for part in parts {
        let value: f64 = part.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        total = total * 60.0 + value;
    }

    Some(total)
}

/// Format seconds as "H:MM:SS", or "M:SS" under an hour
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Average pace as "M:SS/mi"; None when either total is zero
pub fn format_pace(total_seconds: f64, total_miles: f64) -> Option<String> {
    if total_seconds <= 0.0 || total_miles <= 0.0 {
        return None;
    }

    let per_mile = (total_seconds / total_miles).round() as u64;
    Some(format!("{}:{:02}/mi", per_mile / 60, per_mile % 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::races::distance::distance_to_miles;

    #[test]
    fn test_time_to_seconds() {
        assert_eq!(time_to_seconds("1:05:30"), Some(3930.0));
        assert_eq!(time_to_seconds("23:30"), Some(1410.0));
        assert_eq!(time_to_seconds("95"), Some(95.0));
        assert_eq!(time_to_seconds(" 25:00 "), Some(1500.0));
    }

    #[test]
    fn test_time_to_seconds_rejects_garbage() {
        assert_eq!(time_to_seconds(""), None);
        assert_eq!(time_to_seconds("fast"), None);
        assert_eq!(time_to_seconds("1::30"), None);
        assert_eq!(time_to_seconds("1:2:3:4"), None);
        assert_eq!(time_to_seconds("-5:00"), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(90.0), "1:30");
        assert_eq!(format_duration(3930.0), "1:05:30");
        assert_eq!(format_duration(59.6), "1:00");
        assert_eq!(format_duration(0.0), "0:00");
    }

    #[test]
    fn test_format_pace() {
        let seconds = time_to_seconds("1:05:30").unwrap();
        let pace = format_pace(seconds, distance_to_miles("10k"));
        assert_eq!(pace.as_deref(), Some("10:32/mi"));
    }

    #[test]
    fn test_format_pace_undefined_for_zero() {
        assert_eq!(format_pace(0.0, 3.1), None);
        assert_eq!(format_pace(1500.0, 0.0), None);
    }
}
