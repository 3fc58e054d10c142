//! Race distances
//!
//! Converts free-form distance labels into miles.

/// Miles per kilometer
pub const MILES_PER_KM: f64 = 0.621371;
/// Miles per meter
pub const MILES_PER_METER: f64 = MILES_PER_KM / 1000.0;

pub const MILES_5K: f64 = 3.10686;
pub const MILES_10K: f64 = 6.21371;
pub const MILES_HALF_MARATHON: f64 = 13.1094;
pub const MILES_MARATHON: f64 = 26.2188;

/// Distances always listed in records and statistics, in display order
pub const STANDARD_DISTANCES: [&str; 4] = ["5k", "10k", "1/2 marathon", "marathon"];

/// Canonical standard label for a distance label, if it is one
///
/// "5K", " 10k ", "Half Marathon" and "half-marathon" are all recognized.
pub fn standard_distance(label: &str) -> Option<&'static str> {
    let key = label.trim().to_lowercase();
    match key.as_str() {
        "5k" => Some(STANDARD_DISTANCES[0]),
        "10k" => Some(STANDARD_DISTANCES[1]),
        "1/2 marathon" | "half marathon" | "half-marathon" | "half" => Some(STANDARD_DISTANCES[2]),
        "marathon" => Some(STANDARD_DISTANCES[3]),
        _ => None,
    }
}

/// Leading number of a label ("8.5 mile" -> 8.5); None if it does not start with one
fn leading_number(label: &str) -> Option<(f64, &str)> {
    let end = label
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map_or(label.len(), |(i, _)| i);

    let number = label[..end].parse::<f64>().ok()?;
    Some((number, label[end..].trim()))
}

/// Convert a distance label to miles
///
/// Standard labels use fixed values. Other labels are read as a leading
/// number followed by an optional unit hint ("mile"/"mi", "km"/"k",
/// "meter"/"m"); a bare number is taken as miles. Labels without a leading
/// number count as zero.
pub fn distance_to_miles(label: &str) -> f64 {
    match standard_distance(label) {
        Some("5k") => return MILES_5K,
        Some("10k") => return MILES_10K,
        Some("1/2 marathon") => return MILES_HALF_MARATHON,
        Some("marathon") => return MILES_MARATHON,
        _ => {}
    }

    let lower = label.trim().to_lowercase();
    let (number, hint) = match leading_number(&lower) {
        Some(parsed) => parsed,
        None => return 0.0,
    };

    if hint.starts_with("mi") {
        number
    } else if hint.starts_with("km") || hint.starts_with("kilomet") || hint.starts_with('k') {
        number * MILES_PER_KM
    } else if hint.starts_with("met") || hint.starts_with('m') {
        number * MILES_PER_METER
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_distances() {
        assert_eq!(distance_to_miles("5k"), 3.10686);
        assert_eq!(distance_to_miles("10k"), 6.21371);
        assert_eq!(distance_to_miles("1/2 marathon"), 13.1094);
        assert_eq!(distance_to_miles("Half Marathon"), 13.1094);
        assert_eq!(distance_to_miles("Marathon"), 26.2188);
        assert_eq!(distance_to_miles(" 5K "), 3.10686);
    }

    #[test]
    fn test_free_form_miles() {
        assert_eq!(distance_to_miles("8 mile"), 8.0);
        assert_eq!(distance_to_miles("4 miles"), 4.0);
        assert_eq!(distance_to_miles("3.5mi"), 3.5);
        assert_eq!(distance_to_miles("7"), 7.0);
    }

    #[test]
    fn test_free_form_metric() {
        assert!((distance_to_miles("15k") - 15.0 * MILES_PER_KM).abs() < 1e-9);
        assert!((distance_to_miles("21.1 km") - 21.1 * MILES_PER_KM).abs() < 1e-9);
        assert!((distance_to_miles("25 kilometers") - 25.0 * MILES_PER_KM).abs() < 1e-9);
        assert!((distance_to_miles("1500 meters") - 1500.0 * MILES_PER_METER).abs() < 1e-9);
        assert!((distance_to_miles("800m") - 800.0 * MILES_PER_METER).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_distance_is_zero() {
        assert_eq!(distance_to_miles("ultra"), 0.0);
        assert_eq!(distance_to_miles(""), 0.0);
    }

    #[test]
    fn test_standard_distance_labels() {
        assert_eq!(standard_distance("5K"), Some("5k"));
        assert_eq!(standard_distance("half marathon"), Some("1/2 marathon"));
        assert_eq!(standard_distance("Half-Marathon"), Some("1/2 marathon"));
        assert_eq!(distance_to_miles("half-marathon"), MILES_HALF_MARATHON);
        assert_eq!(standard_distance("15k"), None);
    }
}
