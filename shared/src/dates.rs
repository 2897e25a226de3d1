use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

use crate::error::{EditorError, Result};

/// Shown in the date column when the server sends something unparseable.
pub const INVALID_DATE: &str = "(invalid date)";

pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| EditorError::UnknownTimezone(name.to_string()))
}

/// Formats an ISO 8601 timestamp as `YYYY-MM-DD` in `tz`.
///
/// Timestamps carrying an offset are converted into `tz`; timestamps without
/// one are taken to already be local to `tz`.
pub fn format_date(value: &str, tz: Tz) -> String {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.with_timezone(&tz).format("%Y-%m-%d").to_string();
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return naive.date().format("%Y-%m-%d").to_string();
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => INVALID_DATE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacific() -> Tz {
        parse_timezone(DEFAULT_TIMEZONE).unwrap()
    }

    #[test]
    fn test_offset_timestamps_are_normalized() {
        // 03:30 UTC is still the previous evening in California.
        assert_eq!(format_date("2024-03-02T03:30:00Z", pacific()), "2024-03-01");
        assert_eq!(format_date("2024-03-02T03:30:00+00:00", pacific()), "2024-03-01");
        assert_eq!(format_date("2024-03-02T20:00:00Z", pacific()), "2024-03-02");
    }

    #[test]
    fn test_naive_values_keep_their_date() {
        assert_eq!(format_date("2024-03-02T03:30:00", pacific()), "2024-03-02");
        assert_eq!(format_date("2024-03-02 23:59:59.5", pacific()), "2024-03-02");
        assert_eq!(format_date("2024-03-02", pacific()), "2024-03-02");
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(format_date("", pacific()), INVALID_DATE);
        assert_eq!(format_date("03/02/2024", pacific()), INVALID_DATE);
        assert_eq!(format_date("2024-13-01", pacific()), INVALID_DATE);
    }

    #[test]
    fn test_unknown_timezone() {
        assert!(matches!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(EditorError::UnknownTimezone(_))
        ));
    }
}
