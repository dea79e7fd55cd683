//! JSON encoding of values as they appear in API payloads.

use chrono::TimeDelta;
use serde::{Serialize, Serializer, de::DeserializeOwned};
use serde_json::{Number, Value as Json};

use super::{
    Data, File, User, Value,
    parse::{parse_time, parse_time_of_day, parse_url},
    time::{self, NaiveZone},
};
use crate::{Error, FieldType, Result, field_type::Storage};

/// Largest float that still converts to an integer without loss.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Value {
    /// Encode this value as a JSON fragment.
    ///
    /// Numbers stay numbers, lists become arrays, users and files become
    /// objects. The zero time encodes as `""`, which clears a field.
    pub fn to_wire(&self) -> Json {
        match &self.data {
            Data::Bool(b) => Json::Bool(*b),
            Data::Duration(d) => Json::from(d.num_milliseconds()),
            Data::Float(v) => float_to_wire(*v),
            Data::Str(s) => Json::String(s.clone()),
            Data::StrList(list) => Json::from(list.clone()),
            Data::Time(None) => Json::String(String::new()),
            Data::Time(Some(t)) => Json::String(time::format(self.field_type, t)),
            Data::Url(u) => Json::String(u.as_ref().map(|u| u.to_string()).unwrap_or_default()),
            Data::User(u) => to_json(u),
            Data::UserList(users) => to_json(users),
            Data::File(f) => to_json(f),
        }
    }

    /// Decode a JSON fragment for a field of the given type.
    ///
    /// An absent or `null` fragment is the type's zero value. Errors are not
    /// annotated with a field id; see [`Error::with_field`].
    pub fn from_wire(fragment: Option<&Json>, field_type: FieldType) -> Result<Self> {
        let fragment = match fragment {
            None | Some(Json::Null) => return Ok(Self::zero(field_type)),
            Some(fragment) => fragment,
        };

        let data = match field_type.storage() {
            Storage::Float => Data::Float(wire_number(fragment, field_type)?),
            Storage::String => Data::Str(wire_string(fragment, field_type)?.to_string()),
            Storage::StringList => Data::StrList(wire_object(fragment, field_type)?),
            Storage::Time => {
                let s = wire_string(fragment, field_type)?;
                Data::Time(match field_type {
                    FieldType::TimeOfDay => parse_time_of_day(s)?,
                    _ => parse_time(s, field_type, NaiveZone::Utc)?,
                })
            }
            Storage::Duration => {
                let ms = wire_number(fragment, field_type)?;
                Data::Duration(TimeDelta::microseconds((ms * 1000.0).round() as i64))
            }
            Storage::Bool => match fragment {
                Json::Bool(b) => Data::Bool(*b),
                other => return Err(mismatch(field_type, "a boolean", other)),
            },
            Storage::Url => Data::Url(parse_url(wire_string(fragment, field_type)?)?),
            Storage::User => Data::User(Some(wire_object::<User>(fragment, field_type)?)),
            Storage::UserList => Data::UserList(wire_object(fragment, field_type)?),
            Storage::File => Data::File(Some(wire_object::<File>(fragment, field_type)?)),
        };
        Ok(Self::new(field_type, data))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

fn float_to_wire(v: f64) -> Json {
    if v.fract() == 0.0 && v.abs() < MAX_SAFE_INTEGER {
        Json::from(v as i64)
    } else {
        Number::from_f64(v).map(Json::Number).unwrap_or(Json::Null)
    }
}

fn to_json<T: Serialize>(value: &T) -> Json {
    serde_json::to_value(value).unwrap_or(Json::Null)
}

fn wire_number(fragment: &Json, field_type: FieldType) -> Result<f64> {
    match fragment {
        Json::Number(n) => n
            .as_f64()
            .ok_or_else(|| mismatch(field_type, "a number", fragment)),
        Json::String(s) => super::parse::parse_number(s, field_type),
        other => Err(mismatch(field_type, "a number", other)),
    }
}

fn wire_string(fragment: &Json, field_type: FieldType) -> Result<&str> {
    match fragment {
        Json::String(s) => Ok(s),
        other => Err(mismatch(field_type, "a string", other)),
    }
}

fn wire_object<T: DeserializeOwned>(fragment: &Json, field_type: FieldType) -> Result<T> {
    T::deserialize(fragment).map_err(|e| Error::invalid_value(field_type, e.to_string()))
}

fn mismatch(field_type: FieldType, expected: &str, found: &Json) -> Box<Error> {
    let found = match found {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    };
    Error::invalid_value(field_type, format!("expected {expected}, found {found}"))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::value::FileVersion;

    fn roundtrip(v: &Value) -> Value {
        Value::from_wire(Some(&v.to_wire()), v.field_type()).unwrap()
    }

    #[test]
    fn test_numbers_are_json_numbers() {
        assert_eq!(Value::numeric(42.0).to_wire(), json!(42));
        assert_eq!(Value::numeric(3.25).to_wire(), json!(3.25));
        assert_eq!(Value::float(FieldType::Percent, 0.5).unwrap().to_wire(), json!(0.5));
    }

    #[test]
    fn test_absent_fragment_is_zero() {
        for ft in FieldType::ALL {
            let absent = Value::from_wire(None, ft).unwrap();
            let null = Value::from_wire(Some(&Json::Null), ft).unwrap();
            assert_eq!(absent, Value::zero(ft), "{ft}");
            assert_eq!(null, Value::zero(ft), "{ft}");
        }
    }

    #[test]
    fn test_wire_roundtrip_per_type() {
        let t = Utc.with_ymd_and_hms(2022, 1, 2, 3, 4, 5).unwrap();
        let values = vec![
            Value::float(FieldType::RecordId, 17.0).unwrap(),
            Value::numeric(-3.5),
            Value::float(FieldType::Currency, 19.99).unwrap(),
            Value::float(FieldType::Rating, 4.0).unwrap(),
            Value::text(FieldType::Text, "hello").unwrap(),
            Value::text(FieldType::Predecessor, "4").unwrap(),
            Value::multitext(vec!["a".into(), "b,c".into()]),
            Value::time(FieldType::Date, Some(Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap()))
                .unwrap(),
            Value::time(FieldType::DateTime, Some(t)).unwrap(),
            Value::time(FieldType::TimeOfDay, Some(Utc.with_ymd_and_hms(1982, 3, 19, 3, 4, 5).unwrap()))
                .unwrap(),
            Value::duration(TimeDelta::milliseconds(1500)),
            Value::checkbox(true),
            Value::url(Some("https://example.com/x".parse().unwrap())),
            Value::user(Some(User {
                id: "5.abc".into(),
                email: "jo@example.com".into(),
                name: "Jo".into(),
            })),
            Value::user_list(vec![User::new("1.a"), User::new("2.b")]),
            Value::file(Some(File {
                url: "https://example.quickbase.com/up/1".into(),
                versions: vec![FileVersion {
                    version: 1,
                    name: "a.txt".into(),
                    uploaded: Some(t),
                    creator: Some(User::new("5.abc")),
                }],
            })),
        ];
        for v in values {
            assert_eq!(roundtrip(&v), v, "{}", v.field_type());
        }
    }

    #[test]
    fn test_user_and_file_are_objects() {
        let user = Value::user(Some(User {
            id: "5.abc".into(),
            email: "jo@example.com".into(),
            name: "Jo".into(),
        }));
        assert_eq!(
            user.to_wire(),
            json!({"id": "5.abc", "email": "jo@example.com", "name": "Jo"})
        );
        let file = Value::file(Some(File {
            url: "https://example.quickbase.com/up/1".into(),
            versions: Vec::new(),
        }));
        assert_eq!(file.to_wire(), json!({"url": "https://example.quickbase.com/up/1"}));
    }

    #[test]
    fn test_file_versions_decode() {
        let fragment = json!({
            "url": "https://example.quickbase.com/up/1",
            "versions": [{
                "versionNumber": 2,
                "name": "report.pdf",
                "uploaded": "2021-08-01T10:00:00Z",
                "creator": {"id": "5.abc", "email": "jo@example.com", "name": "Jo"}
            }]
        });
        let v = Value::from_wire(Some(&fragment), FieldType::File).unwrap();
        let file = v.as_file().unwrap();
        assert_eq!(file.versions[0].version, 2);
        assert_eq!(
            file.versions[0].uploaded,
            Some(Utc.with_ymd_and_hms(2021, 8, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(v.to_string(), "https://example.quickbase.com/up/1");
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let v = Value::from_wire(Some(&json!("12.5")), FieldType::Currency).unwrap();
        assert_eq!(v.as_f64(), Some(12.5));
    }

    #[test]
    fn test_shape_mismatch_is_invalid_value() {
        let err = Value::from_wire(Some(&json!("many")), FieldType::Numeric).unwrap_err();
        assert!(matches!(*err, Error::InvalidValue { field_type: FieldType::Numeric, .. }));

        let err = Value::from_wire(Some(&json!(3)), FieldType::Text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid text value: expected a string, found a number"
        );

        assert!(Value::from_wire(Some(&json!("yes")), FieldType::Checkbox).is_err());
        assert!(Value::from_wire(Some(&json!("a")), FieldType::MultiText).is_err());
    }

    #[test]
    fn test_zero_time_encodes_empty() {
        assert_eq!(Value::zero(FieldType::Date).to_wire(), json!(""));
        let v = Value::from_wire(Some(&json!("")), FieldType::DateTime).unwrap();
        assert!(v.is_zero());
    }

    #[test]
    fn test_serialize_matches_to_wire() {
        let v = Value::multitext(vec!["x".into()]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"["x"]"#);
    }
}
