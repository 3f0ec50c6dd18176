//! Lenient timestamp parsing shared by payloads, filters and the importer.
//!
//! Accepted forms, all normalised to UTC:
//! - RFC 3339 (`2024-03-01T09:30:00+01:00`, `2024-03-01T08:30:00Z`)
//! - naive date-time (`2024-03-01T08:30:00`, `2024-03-01 08:30:00`), taken as UTC
//! - plain date (`2024-03-01`), taken as midnight UTC

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Parse a timestamp in any of the accepted forms.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(date) = parse_date(raw) {
        return Ok(midnight(date));
    }

    Err(format!("invalid timestamp {raw:?}"))
}

/// Upper end of a time range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeBound {
    /// Matches values `<=` the instant.
    Inclusive(DateTime<Utc>),
    /// Matches values `<` the instant.
    Exclusive(DateTime<Utc>),
}

/// Parse the lower end of a range; a plain date means the start of that day.
pub fn lower_bound(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw)
}

/// Parse the upper end of a range; a plain date covers the whole of that day.
pub fn upper_bound(raw: &str) -> Result<TimeBound, String> {
    let trimmed = raw.trim();
    if let Some(date) = parse_date(trimmed) {
        let next = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| format!("date out of range {trimmed:?}"))?;
        return Ok(TimeBound::Exclusive(midnight(next)));
    }
    parse_timestamp(trimmed).map(TimeBound::Inclusive)
}

/// Serde adapter for `Option<DateTime<Utc>>` fields that accepts every supported form.
pub mod option {
    use super::parse_timestamp;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.filter(|s| !s.trim().is_empty())
            .map(|s| parse_timestamp(&s).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T08:30:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T09:30:00+01:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T08:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01 08:30:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_upper_bound_plain_date_covers_whole_day() {
        assert_eq!(
            upper_bound("2024-03-01").unwrap(),
            TimeBound::Exclusive(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(
            upper_bound("2024-03-01T12:00:00Z").unwrap(),
            TimeBound::Inclusive(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
    }
}
