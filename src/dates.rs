/// Display dates and sort keys for saved articles
///
/// Articles carry a human-readable `date` ("Oct 16, 2026, 3:04 PM") and,
/// for records written by this version, a `savedAt` millisecond timestamp.
/// Older records only have the display string, which is parsed back here.
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Format used for the `date` field shown in the popup
pub const DISPLAY_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

/// Formats accepted when re-parsing stored display strings, most common first
const PARSE_FORMATS: [&str; 6] = [
    "%b %d, %Y, %I:%M %p",
    "%b %d, %Y, %I:%M:%S %p",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y, %I:%M %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

pub fn format_display(at: &DateTime<Local>) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a stored display date into epoch milliseconds
///
/// Strings without an offset are read as local time, which is how the
/// extension wrote them.
pub fn parse_display(date: &str) -> Option<i64> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.timestamp_millis());
    }

    PARSE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
        .map(|naive| {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.timestamp_millis())
                // Skipped by a DST jump; close enough for ordering
                .unwrap_or_else(|| naive.and_utc().timestamp_millis())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format_display(&local(2026, 10, 16, 15, 4)), "Oct 16, 2026, 3:04 PM");
        assert_eq!(format_display(&local(2024, 1, 5, 9, 7)), "Jan 5, 2024, 9:07 AM");
    }

    #[test]
    fn test_parse_display_format() {
        let at = local(2026, 10, 16, 15, 4);
        assert_eq!(parse_display("Oct 16, 2026, 3:04 PM"), Some(at.timestamp_millis()));

        let early = local(2024, 1, 5, 9, 7);
        assert_eq!(parse_display("Jan 5, 2024, 9:07 AM"), Some(early.timestamp_millis()));
    }

    #[test]
    fn test_parse_other_formats() {
        let at = Local.with_ymd_and_hms(2024, 3, 2, 13, 45, 30).unwrap();
        assert_eq!(parse_display("3/2/2024, 1:45:30 PM"), Some(at.timestamp_millis()));
        assert_eq!(parse_display("2024-03-02 13:45:30"), Some(at.timestamp_millis()));
        assert_eq!(parse_display("2024-03-02T13:45:30"), Some(at.timestamp_millis()));
        assert_eq!(
            parse_display("2024-03-02T13:45:30Z"),
            Some(Utc.with_ymd_and_hms(2024, 3, 2, 13, 45, 30).unwrap().timestamp_millis())
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_display(""), None);
        assert_eq!(parse_display("   "), None);
        assert_eq!(parse_display("yesterday-ish"), None);
        assert_eq!(parse_display("Foo 99, 2024, 3:04 PM"), None);
    }

    #[test]
    fn test_display_round_trip_orders_correctly() {
        let older = format_display(&local(2023, 12, 31, 23, 59));
        let newer = format_display(&local(2024, 1, 1, 0, 1));
        assert!(parse_display(&older) < parse_display(&newer));
    }
}
