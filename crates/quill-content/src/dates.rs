//! Lenient timestamp parsing and display formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an author-supplied date string.
///
/// Accepts RFC 3339, a handful of common date-time layouts, and a bare
/// `YYYY-MM-DD` date (midnight).
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, layout) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Format a timestamp with a strftime pattern for display.
pub fn format(date: &NaiveDateTime, pattern: &str) -> String {
    date.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_date() {
        let dt = parse("2024-01-05").unwrap();

        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(dt.time(), NaiveTime::MIN);
    }

    #[test]
    fn parses_datetime_layouts() {
        assert!(parse("2024-01-05T09:30:00").is_some());
        assert!(parse("2024-01-05 09:30:00").is_some());
        assert!(parse("2024-01-05 09:30").is_some());
        assert!(parse("2024-01-05T09:30:00+02:00").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("next tuesday").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn formats_for_display() {
        let dt = parse("2024-01-05").unwrap();

        assert_eq!(format(&dt, "%Y/%m/%d"), "2024/01/05");
    }
}
