//! Acquisition dates from file names.
//!
//! Point-cloud deliveries commonly embed the acquisition day as `YYYYMMDD`
//! somewhere in the file name (`Isar_20240812_UPH_10cm.copc.laz`). This is a
//! heuristic, not a format contract: anything that does not look like a date
//! yields `None` instead of an error.

use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

fn date_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]{8}").expect("valid date token pattern"))
}

/// Extract the acquisition date from the base name of `file_name`.
///
/// Only the first 8-digit run is considered; if it is not a valid calendar
/// date the result is `None` even when a later run would be.
pub fn extract_acquisition_date(file_name: impl AsRef<Path>) -> Option<NaiveDate> {
    let path = file_name.as_ref();
    let base = path.file_name().and_then(|n| n.to_str())?;

    let Some(token) = date_token().find(base) else {
        tracing::debug!(file = %base, "No date token in file name");
        return None;
    };

    let digits = token.as_str();
    let year: i32 = digits[0..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day);
    if date.is_none() {
        tracing::debug!(file = %base, token = %digits, "Date token is not a calendar date");
    }
    date
}

/// Acquisition date as an instant at midnight UTC
pub fn extract_acquisition_datetime(file_name: impl AsRef<Path>) -> Option<DateTime<Utc>> {
    extract_acquisition_date(file_name)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_survey_file_name() {
        assert_eq!(
            extract_acquisition_date("Isar_20240812_UPH_10cm.copc.laz"),
            NaiveDate::from_ymd_opt(2024, 8, 12)
        );
    }

    #[test]
    fn test_no_token_is_unknown() {
        assert_eq!(extract_acquisition_date("nofile.copc.laz"), None);
        assert_eq!(extract_acquisition_date("scan_2024081.laz"), None);
    }

    #[test]
    fn test_invalid_calendar_date_is_unknown() {
        assert_eq!(extract_acquisition_date("Isar_20241341_ULS.laz"), None);
        assert_eq!(extract_acquisition_date("Isar_20230229_ULS.laz"), None);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            extract_acquisition_date("20250325_merged_20240812.laz"),
            NaiveDate::from_ymd_opt(2025, 3, 25)
        );
        // An invalid first token is not skipped in favour of a later one
        assert_eq!(extract_acquisition_date("99999999_20240812.laz"), None);
    }

    #[test]
    fn test_longer_digit_run_uses_leading_digits() {
        assert_eq!(
            extract_acquisition_date("tile_2024081201.laz"),
            NaiveDate::from_ymd_opt(2024, 8, 12)
        );
    }

    #[test]
    fn test_only_base_name_is_searched() {
        assert_eq!(extract_acquisition_date("/data/20240101/scan.laz"), None);
        assert_eq!(
            extract_acquisition_date("/data/20240101/scan_20241105.laz"),
            NaiveDate::from_ymd_opt(2024, 11, 5)
        );
    }

    #[test]
    fn test_datetime_is_midnight_utc() {
        let dt = extract_acquisition_datetime("Isar_20250325_ULS_10cm.copc.laz").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-25T00:00:00+00:00");
    }
}
