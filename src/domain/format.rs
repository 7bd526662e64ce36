// Display formatting for measurements, timestamps and log text
use super::sample::parse_utc_timestamp;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

/// Shown wherever a value is missing.
pub const PLACEHOLDER: &str = "--";

/// Format a measurement to `decimals` places.
///
/// Rounds the exact binary value of the float, so `12.345` (stored as
/// `12.3450000000000006...`) becomes `"12.35"`.
pub fn format_magnitude(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Ping is shown as a whole number of milliseconds, rounding half away from zero.
pub fn format_ping(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v.round()),
        None => PLACEHOLDER.to_string(),
    }
}

/// Short `HH:MM` label for a backend timestamp, shown in the local timezone.
pub fn format_time_label(timestamp: &str) -> String {
    format_time_label_in(timestamp, &Local)
}

/// Same as [`format_time_label`] for an explicit display timezone.
///
/// The timestamp is always parsed as UTC; only the displayed wall clock
/// depends on `tz`.
pub fn format_time_label_in<Tz>(timestamp: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    parse_utc_timestamp(timestamp)
        .map(|instant| instant.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Render the scheduler's next run time as `YYYY/MM/DD HH:MM:SS` local time.
pub fn format_next_run(raw: &str) -> String {
    format_next_run_in(raw, &Local)
}

pub fn format_next_run_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let instant = DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_utc_timestamp(raw));

    match instant {
        Some(instant) => instant
            .with_timezone(tz)
            .format("%Y/%m/%d %H:%M:%S")
            .to_string(),
        None => raw.to_string(),
    }
}

/// Escape text for an HTML text node. Quotes are left alone.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_format_magnitude() {
        assert_eq!(format_magnitude(None, 1), "--");
        assert_eq!(format_magnitude(Some(12.345), 2), "12.35");
        assert_eq!(format_magnitude(Some(94.26), 1), "94.3");
        assert_eq!(format_magnitude(Some(3.0), 1), "3.0");
    }

    #[test]
    fn test_format_ping() {
        assert_eq!(format_ping(None), "--");
        assert_eq!(format_ping(Some(12.4)), "12");
        assert_eq!(format_ping(Some(12.5)), "13");
        assert_eq!(format_ping(Some(0.2)), "0");
    }

    #[test]
    fn test_time_label_parses_as_utc() {
        assert_eq!(format_time_label_in("2024-05-01 10:05:00", &Utc), "10:05");

        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(format_time_label_in("2024-05-01 23:30:00", &tokyo), "08:30");

        assert_eq!(format_time_label_in("not a time", &Utc), "--");
    }

    #[test]
    fn test_format_next_run() {
        assert_eq!(
            format_next_run_in("2024-05-01T10:15:00+00:00", &Utc),
            "2024/05/01 10:15:00"
        );
        assert_eq!(
            format_next_run_in("2024-05-01 10:15:00", &Utc),
            "2024/05/01 10:15:00"
        );
        assert_eq!(format_next_run_in("soon", &Utc), "soon");
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape_markup("<b>&ERROR</b>"),
            "&lt;b&gt;&amp;ERROR&lt;/b&gt;"
        );
        assert_eq!(escape_markup(r#"say "hi""#), r#"say "hi""#);
    }
}
