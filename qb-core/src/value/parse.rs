//! Conversion of command line strings into typed values.

use url::Url;

use super::{
    Data, User, Value,
    duration::parse_duration,
    time::{NaiveZone, TIME_OF_DAY_DATE, parse_any},
};
use crate::{Error, FieldType, Result};

impl Value {
    /// Parse a plain string into a value of the given type.
    ///
    /// Empty input clears date, time and list fields rather than failing.
    pub fn parse(raw: &str, field_type: FieldType) -> Result<Self> {
        let data = match field_type {
            FieldType::RecordId
            | FieldType::Numeric
            | FieldType::Currency
            | FieldType::Percent
            | FieldType::Rating => Data::Float(parse_number(raw, field_type)?),
            FieldType::Text
            | FieldType::TextMultiLine
            | FieldType::TextMultipleChoice
            | FieldType::RichText
            | FieldType::Address
            | FieldType::Phone
            | FieldType::Email
            | FieldType::ReportLink
            | FieldType::ICalendar
            | FieldType::VCard
            | FieldType::Predecessor => Data::Str(raw.to_string()),
            FieldType::MultiText => Data::StrList(
                read_csv_line(raw).map_err(|reason| Error::invalid_value(field_type, reason))?,
            ),
            FieldType::Date => Data::Time(parse_time(raw, field_type, NaiveZone::Utc)?),
            FieldType::DateTime => Data::Time(parse_time(raw, field_type, NaiveZone::Local)?),
            FieldType::TimeOfDay => Data::Time(parse_time_of_day(raw)?),
            FieldType::Duration => Data::Duration(
                parse_duration(raw).map_err(|reason| Error::invalid_value(field_type, reason))?,
            ),
            FieldType::Checkbox => Data::Bool(parse_bool(raw)?),
            FieldType::User => Data::User(match raw.trim() {
                "" => None,
                id => Some(User::new(id)),
            }),
            FieldType::UserList => Data::UserList(
                read_csv_line(raw)
                    .map_err(|reason| Error::invalid_value(field_type, reason))?
                    .into_iter()
                    .map(|id| User::new(id.trim()))
                    .collect(),
            ),
            FieldType::File => {
                return Err(Box::new(Error::UnsupportedConversion {
                    field_type,
                    field_id: None,
                }));
            }
            FieldType::Url => Data::Url(parse_url(raw)?),
        };
        Ok(Self::new(field_type, data))
    }

    /// Parse a string for a type given by name, e.g. `"date-time"`.
    pub fn parse_as(raw: &str, type_name: &str) -> Result<Self> {
        Self::parse(raw, FieldType::canonical(type_name)?)
    }
}

/// Parse a float for one of the numeric types, keeping the type in errors.
pub(crate) fn parse_number(raw: &str, field_type: FieldType) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::invalid_value(field_type, format!("'{raw}' is not a number")))?;
    if !value.is_finite() {
        return Err(Error::invalid_value(
            field_type,
            format!("'{raw}' is not a finite number"),
        ));
    }
    Ok(value)
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(Error::invalid_value(
            FieldType::Checkbox,
            format!("'{raw}' is not a boolean"),
        )),
    }
}

pub(crate) fn parse_time(
    raw: &str,
    field_type: FieldType,
    zone: NaiveZone,
) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_any(raw, zone)
        .map(Some)
        .map_err(|reason| Error::invalid_value(field_type, reason))
}

pub(crate) fn parse_time_of_day(raw: &str) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_any(&format!("{TIME_OF_DAY_DATE} {}", raw.trim()), NaiveZone::Utc)
        .map(Some)
        .map_err(|_| {
            Error::invalid_value(FieldType::TimeOfDay, format!("'{raw}' is not a time of day"))
        })
}

pub(crate) fn parse_url(raw: &str) -> Result<Option<Url>> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    match Url::parse(s) {
        Ok(url) => Ok(Some(url)),
        Err(url::ParseError::RelativeUrlWithoutBase) if !s.contains(char::is_whitespace) => {
            Url::parse(&format!("https://{s}"))
                .map(Some)
                .map_err(|e| Error::invalid_value(FieldType::Url, format!("'{raw}': {e}")))
        }
        Err(e) => Err(Error::invalid_value(FieldType::Url, format!("'{raw}': {e}"))),
    }
}

/// Read a single CSV record. Empty input is an empty list.
pub(crate) fn read_csv_line(raw: &str) -> std::result::Result<Vec<String>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let mut records = reader.records();
    let items = match records.next() {
        Some(record) => record
            .map_err(|e| e.to_string())?
            .iter()
            .map(String::from)
            .collect(),
        None => return Ok(Vec::new()),
    };
    if records.next().is_some() {
        return Err(format!("'{raw}' spans more than one line, quote items containing newlines"));
    }
    Ok(items)
}

/// Write items as one CSV record without the trailing line terminator.
pub(crate) fn write_csv_line<I, S>(items: I) -> std::result::Result<String, csv::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let items: Vec<S> = items.into_iter().collect();
    if items.is_empty() {
        return Ok(String::new());
    }
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&items)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let line = String::from_utf8_lossy(&bytes);
    Ok(line.strip_suffix('\n').unwrap_or(&line).to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};

    use super::*;

    // ========================================================================
    // Numbers
    // ========================================================================

    #[test]
    fn test_numeric_family_keeps_its_type() {
        for ft in [
            FieldType::Numeric,
            FieldType::Currency,
            FieldType::Percent,
            FieldType::Rating,
            FieldType::RecordId,
        ] {
            let v = Value::parse("42.5", ft).unwrap();
            assert_eq!(v.field_type(), ft);
            assert_eq!(v.as_f64(), Some(42.5));
        }
    }

    #[test]
    fn test_percent_and_rating_errors_name_their_type() {
        let err = Value::parse("abc", FieldType::Percent).unwrap_err();
        assert!(matches!(*err, Error::InvalidValue { field_type: FieldType::Percent, .. }));
        let err = Value::parse("abc", FieldType::Rating).unwrap_err();
        assert!(matches!(*err, Error::InvalidValue { field_type: FieldType::Rating, .. }));
    }

    #[test]
    fn test_numeric_rejects_non_finite() {
        assert!(Value::parse("NaN", FieldType::Numeric).is_err());
        assert!(Value::parse("inf", FieldType::Currency).is_err());
        assert!(Value::parse("", FieldType::Numeric).is_err());
    }

    // ========================================================================
    // Text and lists
    // ========================================================================

    #[test]
    fn test_text_is_verbatim() {
        let v = Value::parse("  spaced, \"quoted\"  ", FieldType::RichText).unwrap();
        assert_eq!(v.as_str(), Some("  spaced, \"quoted\"  "));
    }

    #[test]
    fn test_multitext_is_quote_aware() {
        let v = Value::parse(r#"a,"b,c",d"#, FieldType::MultiText).unwrap();
        assert_eq!(v.as_list().unwrap(), ["a", "b,c", "d"]);
        assert_eq!(v.to_string(), r#"a,"b,c",d"#);
    }

    #[test]
    fn test_multitext_empty_is_empty_list() {
        let v = Value::parse("", FieldType::MultiText).unwrap();
        assert!(v.as_list().unwrap().is_empty());
        assert_eq!(v.to_string(), "");
    }

    #[test]
    fn test_multitext_rejects_second_line() {
        let err = Value::parse("a\nb", FieldType::MultiText).unwrap_err();
        assert!(matches!(*err, Error::InvalidValue { .. }));
        assert!(err.to_string().contains("more than one line"), "{err}");

        let v = Value::parse("\"a\nb\",c", FieldType::MultiText).unwrap();
        assert_eq!(v.as_list().unwrap(), ["a\nb", "c"]);
    }

    #[test]
    fn test_user_list_from_ids() {
        let v = Value::parse("1.abc, 2.def", FieldType::UserList).unwrap();
        let ids: Vec<_> = v.as_users().unwrap().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["1.abc", "2.def"]);
    }

    // ========================================================================
    // Dates and times
    // ========================================================================

    #[test]
    fn test_empty_date_is_zero_time() {
        let v = Value::parse("", FieldType::Date).unwrap();
        assert_eq!(v.as_time(), Some(None));
        assert!(v.is_zero());
    }

    #[test]
    fn test_date_parses_loose_layouts() {
        let v = Value::parse("3/4/2021", FieldType::Date).unwrap();
        assert_eq!(v.to_string(), "2021-03-04");
    }

    #[test]
    fn test_date_time_with_zone() {
        let v = Value::parse("2021-03-04T05:06:07+01:00", FieldType::DateTime).unwrap();
        assert_eq!(
            v.as_time(),
            Some(Some(Utc.with_ymd_and_hms(2021, 3, 4, 4, 6, 7).unwrap()))
        );
        assert_eq!(v.to_string(), "2021-03-04T04:06:07Z");
    }

    #[test]
    fn test_time_of_day_keeps_clock_time() {
        let v = Value::parse("1:45 PM", FieldType::TimeOfDay).unwrap();
        assert_eq!(v.to_string(), "13:45:00");
        assert!(Value::parse("half past", FieldType::TimeOfDay).is_err());
    }

    #[test]
    fn test_duration() {
        let v = Value::parse("1h30m", FieldType::Duration).unwrap();
        assert_eq!(v.as_duration(), Some(TimeDelta::minutes(90)));
        assert!(Value::parse("soon", FieldType::Duration).is_err());
    }

    // ========================================================================
    // Checkbox, URL, file
    // ========================================================================

    #[test]
    fn test_checkbox_constructs_on_success() {
        assert_eq!(Value::parse("true", FieldType::Checkbox).unwrap().as_bool(), Some(true));
        assert_eq!(Value::parse("F", FieldType::Checkbox).unwrap().as_bool(), Some(false));
        assert_eq!(Value::parse("1", FieldType::Checkbox).unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_checkbox_rejects_other_words() {
        let err = Value::parse("notabool", FieldType::Checkbox).unwrap_err();
        assert!(matches!(*err, Error::InvalidValue { field_type: FieldType::Checkbox, .. }));
        assert!(Value::parse("yes", FieldType::Checkbox).is_err());
    }

    #[test]
    fn test_url() {
        let v = Value::parse("https://example.com/a?b=c", FieldType::Url).unwrap();
        assert_eq!(v.to_string(), "https://example.com/a?b=c");
        let v = Value::parse("example.com/docs", FieldType::Url).unwrap();
        assert_eq!(v.to_string(), "https://example.com/docs");
        assert!(Value::parse("http://exa mple.com", FieldType::Url).is_err());
        assert!(Value::parse("", FieldType::Url).unwrap().as_url().is_none());
    }

    #[test]
    fn test_file_cannot_be_parsed() {
        let err = Value::parse("report.pdf", FieldType::File).unwrap_err();
        assert!(matches!(*err, Error::UnsupportedConversion { field_type: FieldType::File, .. }));
    }

    #[test]
    fn test_parse_as_unknown_type_name() {
        let err = Value::parse_as("x", "hologram").unwrap_err();
        assert!(matches!(*err, Error::UnsupportedType { .. }));
        assert_eq!(Value::parse_as("7", "numeric_rating").unwrap().as_f64(), Some(7.0));
    }
}
