//! ExifTool date/time formatting.
//!
//! ExifTool writes dates as `YYYY:MM:DD HH:MM:SS`, optionally followed by a
//! UTC offset (`+09:00`).

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

/// Format with offset, e.g. `2021:06:01 12:30:00+09:00`.
pub const DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S%:z";
/// Format without offset, e.g. `2021:06:01 12:30:00`.
pub const DATE_FORMAT_WITHOUT_TZ: &str = "%Y:%m:%d %H:%M:%S";

/// Format a timestamp the way ExifTool expects it in date tags.
pub fn format_datetime<Tz>(datetime: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    datetime.format(DATE_FORMAT).to_string()
}

/// Parse an ExifTool date with an offset.
pub fn parse_datetime_with_offset(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Parse an ExifTool date, with or without an offset.
///
/// The wall-clock time is returned as written; an offset, if present, is
/// validated and then dropped.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    parse_datetime_with_offset(text)
        .map(|dt| dt.naive_local())
        .or_else(|| NaiveDateTime::parse_from_str(text, DATE_FORMAT_WITHOUT_TZ).ok())
}
