//! Timestamp parsing and calendar helpers

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse the calendar date out of a server timestamp.
///
/// Accepts RFC 3339, naive ISO date-times (with `T` or a space), plain
/// `YYYY-MM-DD` dates and RFC 2822. Offsets are honoured as written; the
/// date is the one printed in the timestamp, not converted to local time.
pub fn parse_timestamp_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc2822(trimmed).ok().map(|dt| dt.date_naive())
}

/// Sunday..=Saturday week containing `reference`.
pub fn week_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = i64::from(reference.weekday().num_days_from_sunday());
    let start = reference - Duration::days(offset);
    (start, start + Duration::days(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_supported_formats() {
        let expected = Some(date(2024, 5, 8));
        assert_eq!(parse_timestamp_date("2024-05-08T10:15:00Z"), expected);
        assert_eq!(parse_timestamp_date("2024-05-08T10:15:00+05:30"), expected);
        assert_eq!(parse_timestamp_date("2024-05-08T10:15:00.123456"), expected);
        assert_eq!(parse_timestamp_date("2024-05-08 10:15:00"), expected);
        assert_eq!(parse_timestamp_date("2024-05-08"), expected);
        assert_eq!(parse_timestamp_date("Wed, 08 May 2024 10:15:00 GMT"), expected);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp_date(""), None);
        assert_eq!(parse_timestamp_date("   "), None);
        assert_eq!(parse_timestamp_date("yesterday"), None);
        assert_eq!(parse_timestamp_date("2024-13-40"), None);
    }

    #[test]
    fn test_week_bounds_sunday_to_saturday() {
        // 2024-05-08 is a Wednesday
        assert_eq!(week_bounds(date(2024, 5, 8)), (date(2024, 5, 5), date(2024, 5, 11)));
        // Sunday starts its own week
        assert_eq!(week_bounds(date(2024, 5, 5)), (date(2024, 5, 5), date(2024, 5, 11)));
        // Saturday closes it
        assert_eq!(week_bounds(date(2024, 5, 11)), (date(2024, 5, 5), date(2024, 5, 11)));
    }
}
