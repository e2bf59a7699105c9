//! Vendor date normalization.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Canonical output format for every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Width of the year a pattern expects.
///
/// chrono's `%Y` accepts one to four digits and `%y` one or two, so a
/// pattern only counts as a match when the year has the width it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Year {
    Full,
    Short,
}

const DATETIME_FORMATS: &[(&str, Year)] = &[
    ("%Y-%m-%d %H:%M:%S", Year::Full),
    ("%Y-%m-%dT%H:%M:%S", Year::Full),
    ("%Y-%m-%dT%H:%M:%S%.f", Year::Full),
    ("%Y-%m-%d %H:%M:%S%.f", Year::Full),
    ("%d-%m-%Y %H:%M:%S", Year::Full),
    ("%d/%m/%Y %H:%M:%S", Year::Full),
];

const DATE_FORMATS: &[(&str, Year)] = &[
    ("%Y-%m-%d", Year::Full),
    ("%Y/%m/%d", Year::Full),
    ("%Y.%m.%d", Year::Full),
    ("%Y%m%d", Year::Full),
    // Day-first: the vendors we map are European.
    ("%d-%m-%Y", Year::Full),
    ("%d/%m/%Y", Year::Full),
    ("%d.%m.%Y", Year::Full),
    ("%d-%m-%y", Year::Short),
    ("%d/%m/%y", Year::Short),
    ("%d.%m.%y", Year::Short),
    ("%d %B %Y", Year::Full),
    ("%d %b %Y", Year::Full),
    ("%B %d, %Y", Year::Full),
    ("%b %d, %Y", Year::Full),
    ("%B %d %Y", Year::Full),
    ("%b %d %Y", Year::Full),
];

/// Normalize a vendor date representation to `YYYY-MM-DD`.
///
/// Returns `None` for blank or unrecognized input.
pub fn format_date(raw: &str) -> Option<String> {
    parse_date(raw).map(|d| d.format(DATE_FORMAT).to_string())
}

/// Parse a vendor date representation.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .filter_map(|(fmt, year)| {
            NaiveDateTime::parse_from_str(raw, fmt)
                .ok()
                .map(|dt| (dt.date(), *year))
        })
        .chain(DATE_FORMATS.iter().filter_map(|(fmt, year)| {
            NaiveDate::parse_from_str(raw, fmt).ok().map(|d| (d, *year))
        }))
        .find(|(date, year)| year_width_matches(raw, *date, *year))
        .map(|(date, _)| date)
}

fn year_width_matches(raw: &str, date: NaiveDate, year: Year) -> bool {
    match year {
        Year::Full => date.year() >= 1000,
        // Short years always end the input.
        Year::Short => raw.chars().rev().take_while(char::is_ascii_digit).count() == 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_date_is_stable() {
        assert_eq!(format_date("2024-01-05").as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_datetime_variants() {
        assert_eq!(
            format_date("2024-01-05 00:00:00").as_deref(),
            Some("2024-01-05")
        );
        assert_eq!(
            format_date("2024-01-05T13:45:00+02:00").as_deref(),
            Some("2024-01-05")
        );
        assert_eq!(
            format_date("2024-01-05T13:45:00.123").as_deref(),
            Some("2024-01-05")
        );
    }

    #[test]
    fn test_day_first() {
        assert_eq!(format_date("05-01-2024").as_deref(), Some("2024-01-05"));
        assert_eq!(format_date("05/01/2024").as_deref(), Some("2024-01-05"));
        assert_eq!(format_date("05.01.2024").as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_textual_months() {
        assert_eq!(
            format_date("5 January 2024").as_deref(),
            Some("2024-01-05")
        );
        assert_eq!(format_date("Jan 5, 2024").as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_day_first_short_year() {
        assert_eq!(format_date("05/01/24").as_deref(), Some("2024-01-05"));
        assert_eq!(format_date("05-01-24").as_deref(), Some("2024-01-05"));
        assert_eq!(format_date("05.01.24").as_deref(), Some("2024-01-05"));
        assert_eq!(format_date("31.12.99").as_deref(), Some("1999-12-31"));
    }

    #[test]
    fn test_truncated_years_are_rejected() {
        assert_eq!(format_date("1/2/3"), None);
        assert_eq!(format_date("5 January 24"), None);
        assert_eq!(format_date("24-01-05 10:00:00"), None);
    }

    #[test]
    fn test_compact() {
        assert_eq!(format_date("20240105").as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(format_date(""), None);
        assert_eq!(format_date("   "), None);
        assert_eq!(format_date("not a date"), None);
        assert_eq!(format_date("2024-13-45"), None);
    }
}
