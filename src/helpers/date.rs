//! Date helper functions

use chrono::NaiveDate;
use std::fmt::Write;

/// Format a date using a Moment.js-style format string
///
/// Formats chrono cannot render (a stray `%`) fall back to `YYYY-MM-DD`.
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    let chrono_format = moment_to_chrono_format(format);
    let mut formatted = String::new();
    if write!(formatted, "{}", date.format(&chrono_format)).is_err() {
        tracing::debug!("Invalid date format {:?}, using ISO dates", format);
        return date_iso(date);
    }
    formatted
}

/// Format a date for `<time datetime>` and feeds
pub fn date_iso(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// RFC 3339 timestamp at midnight UTC, for the Atom feed
pub fn date_rfc3339(date: &NaiveDate) -> String {
    format!("{}T00:00:00Z", date_iso(date))
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each unit
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(&date, "YYYY-MM-DD"), "2024-01-05");
        assert_eq!(format_date(&date, "YYYY/MM/DD"), "2024/01/05");
        assert_eq!(format_date(&date, "MMM DD, YYYY"), "Jan 05, 2024");
    }

    #[test]
    fn test_unrenderable_format_falls_back() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(&date, "YYYY-MM-DD %"), "2024-01-05");
        assert_eq!(format_date(&date, "%Q"), "2024-01-05");
    }

    #[test]
    fn test_date_rfc3339() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(date_rfc3339(&date), "2024-01-05T00:00:00Z");
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("dddd, MMMM DD"), "%A, %B %d");
    }
}
