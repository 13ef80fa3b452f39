use crate::error::{TrackerError, TrackerResult};
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Parses a `YYYY-MM-DD` or `DD.MM.YYYY` date typed by a user.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d.%m.%Y"))
        .map_err(|_| anyhow!("'{}' is not a date, use YYYY-MM-DD or DD.MM.YYYY", input))
}

/// Storage form of a timestamp. Fixed precision keeps stored values
/// ordered as text.
pub fn to_stored(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn from_stored(value: &str) -> TrackerResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TrackerError::CorruptRecord(format!("timestamp '{value}'")))
}

pub fn from_stored_opt(value: Option<&str>) -> TrackerResult<Option<DateTime<Utc>>> {
    value.map(from_stored).transpose()
}

pub fn date_from_stored(value: &str) -> TrackerResult<NaiveDate> {
    value
        .parse::<NaiveDate>()
        .map_err(|_| TrackerError::CorruptRecord(format!("date '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("2024-03-09").ok(), expected);
        assert_eq!(parse_date(" 09.03.2024 ").ok(), expected);
        assert!(parse_date("9 March").is_err());
    }

    #[test]
    fn test_stored_timestamps_round_trip() {
        let now = Utc::now();
        assert_eq!(from_stored(&to_stored(&now)).ok(), Some(now));
        assert!(from_stored("yesterday").is_err());
        assert_eq!(from_stored_opt(None).ok(), Some(None));
    }
}
