//! Date and time parsing and the fixed layouts used on the wire.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::FieldType;

pub const FORMAT_DATE: &str = "%Y-%m-%d";
pub const FORMAT_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%SZ";
pub const FORMAT_TIME_OF_DAY: &str = "%H:%M:%S";

/// Placeholder date prepended to time-of-day input before parsing.
pub(crate) const TIME_OF_DAY_DATE: &str = "3/19/1982";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%z",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S%p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M%p",
    "%m-%d-%Y %H:%M:%S%.f",
    "%m-%d-%Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// How to read input that carries no zone or offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NaiveZone {
    Utc,
    Local,
}

/// Parse a date or date-time written in any of the common layouts.
pub(crate) fn parse_any(input: &str, zone: NaiveZone) -> Result<DateTime<Utc>, String> {
    let s = input.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(s) {
        return Ok(t.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(s, format) {
            return Ok(t.with_timezone(&Utc));
        }
    }

    let naive = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("could not recognise '{s}' as a date"))?;

    match zone {
        NaiveZone::Utc => Ok(Utc.from_utc_datetime(&naive)),
        NaiveZone::Local => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| format!("'{s}' does not exist in the local time zone")),
    }
}

/// Render a time in the layout of its field type, always in UTC.
pub(crate) fn format(field_type: FieldType, t: &DateTime<Utc>) -> String {
    let layout = match field_type {
        FieldType::Date => FORMAT_DATE,
        FieldType::TimeOfDay => FORMAT_TIME_OF_DAY,
        _ => FORMAT_DATE_TIME,
    };
    t.format(layout).to_string()
}

/// Serde helper for optional API timestamps (`2006-01-02T15:04:05Z`).
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::FORMAT_DATE_TIME;

    pub fn serialize<S>(t: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match t {
            Some(t) => serializer.collect_str(&t.format(FORMAT_DATE_TIME)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|t| Some(t.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}
