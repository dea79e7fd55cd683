//! Typed cell values.
//!
//! A [`Value`] pairs a [`FieldType`] with the one representation that type is
//! stored as. Values are built from command line strings with
//! [`Value::parse`], rendered back with `Display`, and moved over the wire
//! with [`Value::to_wire`] and [`Value::from_wire`].

mod duration;
mod parse;
pub mod time;
mod wire;

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, FieldType, Result, field_type::Storage};

/// A platform user reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A file attachment and its version history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct File {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<FileVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileVersion {
    #[serde(rename = "versionNumber", default)]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "time::timestamp")]
    pub uploaded: Option<DateTime<Utc>>,
    #[serde(default)]
    pub creator: Option<User>,
}

/// Storage for a value. Exactly one variant per [`Storage`] kind.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Data {
    Bool(bool),
    Duration(TimeDelta),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
    /// `None` is the zero time, which clears a field.
    Time(Option<DateTime<Utc>>),
    Url(Option<Url>),
    User(Option<User>),
    UserList(Vec<User>),
    File(Option<File>),
}

impl Data {
    fn storage(&self) -> Storage {
        match self {
            Data::Bool(_) => Storage::Bool,
            Data::Duration(_) => Storage::Duration,
            Data::Float(_) => Storage::Float,
            Data::Str(_) => Storage::String,
            Data::StrList(_) => Storage::StringList,
            Data::Time(_) => Storage::Time,
            Data::Url(_) => Storage::Url,
            Data::User(_) => Storage::User,
            Data::UserList(_) => Storage::UserList,
            Data::File(_) => Storage::File,
        }
    }
}

/// A single cell value tagged with its field type.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    field_type: FieldType,
    data: Data,
}

impl Value {
    /// Pair a type with its storage. Callers guarantee the two agree.
    pub(crate) fn new(field_type: FieldType, data: Data) -> Self {
        debug_assert_eq!(field_type.storage(), data.storage());
        Self { field_type, data }
    }

    fn checked(field_type: FieldType, data: Data) -> Result<Self> {
        if field_type.storage() != data.storage() {
            return Err(Error::invalid_value(
                field_type,
                format!("{field_type} fields do not store {:?} values", data.storage()),
            ));
        }
        Ok(Self::new(field_type, data))
    }

    /// The value a field holds when the API omits it.
    pub fn zero(field_type: FieldType) -> Self {
        let data = match field_type.storage() {
            Storage::Bool => Data::Bool(false),
            Storage::Duration => Data::Duration(TimeDelta::zero()),
            Storage::Float => Data::Float(0.0),
            Storage::String => Data::Str(String::new()),
            Storage::StringList => Data::StrList(Vec::new()),
            Storage::Time => Data::Time(None),
            Storage::Url => Data::Url(None),
            Storage::User => Data::User(None),
            Storage::UserList => Data::UserList(Vec::new()),
            Storage::File => Data::File(None),
        };
        Self::new(field_type, data)
    }

    /// A numeric value for any of the float-backed types.
    pub fn float(field_type: FieldType, value: f64) -> Result<Self> {
        Self::checked(field_type, Data::Float(value))
    }

    /// A string value for any of the text-backed types.
    pub fn text(field_type: FieldType, value: impl Into<String>) -> Result<Self> {
        Self::checked(field_type, Data::Str(value.into()))
    }

    /// A date, date-time or time-of-day value.
    pub fn time(field_type: FieldType, value: Option<DateTime<Utc>>) -> Result<Self> {
        Self::checked(field_type, Data::Time(value))
    }

    pub fn numeric(value: f64) -> Self {
        Self::new(FieldType::Numeric, Data::Float(value))
    }

    pub fn checkbox(value: bool) -> Self {
        Self::new(FieldType::Checkbox, Data::Bool(value))
    }

    pub fn duration(value: TimeDelta) -> Self {
        Self::new(FieldType::Duration, Data::Duration(value))
    }

    pub fn multitext(values: Vec<String>) -> Self {
        Self::new(FieldType::MultiText, Data::StrList(values))
    }

    pub fn url(value: Option<Url>) -> Self {
        Self::new(FieldType::Url, Data::Url(value))
    }

    pub fn user(value: Option<User>) -> Self {
        Self::new(FieldType::User, Data::User(value))
    }

    pub fn user_list(values: Vec<User>) -> Self {
        Self::new(FieldType::UserList, Data::UserList(values))
    }

    pub fn file(value: Option<File>) -> Self {
        Self::new(FieldType::File, Data::File(value))
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.data {
            Data::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Data::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Data::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match &self.data {
            Data::StrList(list) => Some(list),
            _ => None,
        }
    }

    /// The stored time; `Some(None)` is the zero time.
    pub fn as_time(&self) -> Option<Option<DateTime<Utc>>> {
        match self.data {
            Data::Time(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self.data {
            Data::Duration(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match &self.data {
            Data::Url(u) => u.as_ref(),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match &self.data {
            Data::User(u) => u.as_ref(),
            _ => None,
        }
    }

    pub fn as_users(&self) -> Option<&[User]> {
        match &self.data {
            Data::UserList(users) => Some(users),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match &self.data {
            Data::File(f) => f.as_ref(),
            _ => None,
        }
    }

    /// True for the value a field holds when it is empty.
    pub fn is_zero(&self) -> bool {
        *self == Self::zero(self.field_type)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Data::Bool(b) => write!(f, "{b}"),
            Data::Duration(d) => write!(f, "{}", d.num_milliseconds()),
            Data::Float(v) => write!(f, "{v}"),
            Data::Str(s) => f.write_str(s),
            Data::StrList(list) => {
                f.write_str(&parse::write_csv_line(list).map_err(|_| fmt::Error)?)
            }
            Data::Time(None) => Ok(()),
            Data::Time(Some(t)) => f.write_str(&time::format(self.field_type, t)),
            Data::Url(u) => f.write_str(u.as_ref().map(Url::as_str).unwrap_or_default()),
            Data::User(u) => f.write_str(u.as_ref().map(|u| u.id.as_str()).unwrap_or_default()),
            Data::UserList(users) => {
                let ids = users.iter().map(|u| u.id.as_str());
                f.write_str(&parse::write_csv_line(ids).map_err(|_| fmt::Error)?)
            }
            Data::File(file) => {
                f.write_str(file.as_ref().map(|file| file.url.as_str()).unwrap_or_default())
            }
        }
    }
}
