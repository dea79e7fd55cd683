//! Field types known to the platform and the aliases users may type for them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// A platform field type.
///
/// The six address sub-components (street, city, region, postal code and
/// country) are plain text on the wire and resolve to [`FieldType::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldType {
    RecordId,
    Text,
    TextMultiLine,
    TextMultipleChoice,
    RichText,
    MultiText,
    Numeric,
    Currency,
    Percent,
    Rating,
    Date,
    DateTime,
    TimeOfDay,
    Duration,
    Checkbox,
    Address,
    Phone,
    Email,
    User,
    UserList,
    File,
    Url,
    ReportLink,
    /// Deprecated by the platform.
    ICalendar,
    /// Deprecated by the platform.
    VCard,
    Predecessor,
}

/// The in-memory representation a field type's values are stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Bool,
    Duration,
    Float,
    String,
    StringList,
    Time,
    Url,
    User,
    UserList,
    File,
}

impl FieldType {
    pub const ALL: [FieldType; 26] = [
        FieldType::RecordId,
        FieldType::Text,
        FieldType::TextMultiLine,
        FieldType::TextMultipleChoice,
        FieldType::RichText,
        FieldType::MultiText,
        FieldType::Numeric,
        FieldType::Currency,
        FieldType::Percent,
        FieldType::Rating,
        FieldType::Date,
        FieldType::DateTime,
        FieldType::TimeOfDay,
        FieldType::Duration,
        FieldType::Checkbox,
        FieldType::Address,
        FieldType::Phone,
        FieldType::Email,
        FieldType::User,
        FieldType::UserList,
        FieldType::File,
        FieldType::Url,
        FieldType::ReportLink,
        FieldType::ICalendar,
        FieldType::VCard,
        FieldType::Predecessor,
    ];

    /// The identifier used for this type in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::RecordId => "recordid",
            FieldType::Text => "text",
            FieldType::TextMultiLine => "text-multi-line",
            FieldType::TextMultipleChoice => "text-multiple-choice",
            FieldType::RichText => "rich-text",
            FieldType::MultiText => "multitext",
            FieldType::Numeric => "numeric",
            FieldType::Currency => "currency",
            FieldType::Percent => "percent",
            FieldType::Rating => "rating",
            FieldType::Date => "date",
            FieldType::DateTime => "timestamp",
            FieldType::TimeOfDay => "timeofday",
            FieldType::Duration => "duration",
            FieldType::Checkbox => "checkbox",
            FieldType::Address => "address",
            FieldType::Phone => "phone",
            FieldType::Email => "email",
            FieldType::User => "userid",
            FieldType::UserList => "multiuserid",
            FieldType::File => "file",
            FieldType::Url => "url",
            FieldType::ReportLink => "dblink",
            FieldType::ICalendar => "ICalendarButton",
            FieldType::VCard => "vCardButton",
            FieldType::Predecessor => "predecessor",
        }
    }

    /// Exact lookup of an API type identifier.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ft| ft.as_str() == name)
    }

    /// Resolve a loosely typed name to a field type.
    ///
    /// Matching ignores case, `-` and `_`, so `text_multi_line`,
    /// `TextMultiLine` and `text-multi-line` are the same type.
    pub fn canonical(input: &str) -> Result<Self> {
        let key: String = input
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let ft = match key.as_str() {
            "recordid" | "rid" => FieldType::RecordId,
            "text"
            | "addressstreet1"
            | "addressstreet2"
            | "addresscity"
            | "addressstateregion"
            | "addressstate"
            | "addressregion"
            | "addresspostalcode"
            | "addresszip"
            | "addresscountry" => FieldType::Text,
            "textmultiline" | "multilinetext" => FieldType::TextMultiLine,
            "textmultiplechoice" | "multiplechoice" => FieldType::TextMultipleChoice,
            "richtext" => FieldType::RichText,
            "multitext" | "multiselect" | "multiselecttext" | "textmultiselect" => {
                FieldType::MultiText
            }
            "numeric" | "number" => FieldType::Numeric,
            "currency" | "numericcurrency" => FieldType::Currency,
            "percent" | "numericpercent" => FieldType::Percent,
            "rating" | "numericrating" => FieldType::Rating,
            "date" => FieldType::Date,
            "timestamp" | "datetime" => FieldType::DateTime,
            "timeofday" | "time" => FieldType::TimeOfDay,
            "duration" => FieldType::Duration,
            "checkbox" | "bool" | "boolean" => FieldType::Checkbox,
            "address" => FieldType::Address,
            "phone" | "phonenumber" => FieldType::Phone,
            "email" | "emailaddress" => FieldType::Email,
            "userid" | "user" => FieldType::User,
            "multiuserid" | "userlist" | "multiuser" => FieldType::UserList,
            "file" | "fileattachment" => FieldType::File,
            "url" => FieldType::Url,
            "dblink" | "reportlink" => FieldType::ReportLink,
            "icalendarbutton" | "icalendar" => FieldType::ICalendar,
            "vcardbutton" | "vcard" => FieldType::VCard,
            "predecessor" => FieldType::Predecessor,
            _ => {
                return Err(Box::new(Error::UnsupportedType {
                    name: input.to_string(),
                    field_id: None,
                }));
            }
        };
        Ok(ft)
    }

    pub fn storage(&self) -> Storage {
        match self {
            FieldType::RecordId
            | FieldType::Numeric
            | FieldType::Currency
            | FieldType::Percent
            | FieldType::Rating => Storage::Float,
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
            | FieldType::Predecessor => Storage::String,
            FieldType::MultiText => Storage::StringList,
            FieldType::Date | FieldType::DateTime | FieldType::TimeOfDay => Storage::Time,
            FieldType::Duration => Storage::Duration,
            FieldType::Checkbox => Storage::Bool,
            FieldType::User => Storage::User,
            FieldType::UserList => Storage::UserList,
            FieldType::File => Storage::File,
            FieldType::Url => Storage::Url,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::canonical(s)
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_wire(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported field type '{name}'")))
    }
}
