use miette::Diagnostic;
use thiserror::Error;

use crate::{FieldId, FieldType};

/// Result type for qbcli-core operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Opaque error produced by whatever fetches table schemas.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("{}unsupported field type '{name}'", field_prefix(.field_id))]
    #[diagnostic(
        code(qb::unsupported_type),
        help("this field type is not known to qb, upgrade to a newer release")
    )]
    UnsupportedType {
        name: String,
        field_id: Option<FieldId>,
    },

    #[error("{}invalid {field_type} value: {reason}", field_prefix(.field_id))]
    #[diagnostic(code(qb::invalid_value))]
    InvalidValue {
        field_type: FieldType,
        field_id: Option<FieldId>,
        reason: String,
    },

    #[error("{}{field_type} values cannot be created from a string", field_prefix(.field_id))]
    #[diagnostic(
        code(qb::unsupported_conversion),
        help("file attachments have to be uploaded, use `qb file create`")
    )]
    UnsupportedConversion {
        field_type: FieldType,
        field_id: Option<FieldId>,
    },

    #[error("schema for table '{table_id}' has not been resolved")]
    #[diagnostic(code(qb::schema_not_resolved))]
    SchemaNotResolved { table_id: String },

    #[error("field {field_id} not found{}", table_suffix(.table_id))]
    #[diagnostic(
        code(qb::unknown_field),
        help("run 'qb field list' to see the fields of the table")
    )]
    UnknownField {
        table_id: Option<String>,
        field_id: FieldId,
    },

    #[error("failed to fetch schema for table '{table_id}'")]
    #[diagnostic(code(qb::schema_fetch))]
    SchemaFetch {
        table_id: String,
        #[source]
        source: BoxError,
    },

    #[error("malformed response payload")]
    #[diagnostic(code(qb::malformed_payload))]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed response payload: {reason}")]
    #[diagnostic(code(qb::malformed_payload))]
    MalformedPayload { reason: String },
}

impl Error {
    pub fn invalid_value(field_type: FieldType, reason: impl Into<String>) -> Box<Self> {
        Box::new(Self::InvalidValue {
            field_type,
            field_id: None,
            reason: reason.into(),
        })
    }

    /// Attach a field identifier to a value-level error.
    ///
    /// Errors that already carry a field id, or that are not about a single
    /// value, are returned untouched.
    pub fn with_field(mut self: Box<Self>, id: FieldId) -> Box<Self> {
        match &mut *self {
            Self::UnsupportedType { field_id, .. }
            | Self::InvalidValue { field_id, .. }
            | Self::UnsupportedConversion { field_id, .. } => {
                if field_id.is_none() {
                    *field_id = Some(id);
                }
            }
            _ => {}
        }
        self
    }

    /// The field this error is about, if known.
    pub fn field_id(&self) -> Option<FieldId> {
        match self {
            Self::UnsupportedType { field_id, .. }
            | Self::InvalidValue { field_id, .. }
            | Self::UnsupportedConversion { field_id, .. } => *field_id,
            Self::UnknownField { field_id, .. } => Some(*field_id),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Box<Error> {
    fn from(source: serde_json::Error) -> Self {
        Box::new(Error::Json { source })
    }
}

fn field_prefix(field_id: &Option<FieldId>) -> String {
    match field_id {
        Some(id) => format!("field {id}: "),
        None => String::new(),
    }
}

fn table_suffix(table_id: &Option<String>) -> String {
    match table_id {
        Some(id) => format!(" in table '{id}'"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_field_annotates_message() {
        let err = Error::invalid_value(FieldType::Numeric, "'abc' is not a number").with_field(7);
        assert_eq!(err.field_id(), Some(7));
        assert_eq!(
            err.to_string(),
            "field 7: invalid numeric value: 'abc' is not a number"
        );
    }

    #[test]
    fn test_with_field_keeps_first_id() {
        let err = Error::invalid_value(FieldType::Date, "bad")
            .with_field(6)
            .with_field(9);
        assert_eq!(err.field_id(), Some(6));
    }

    #[test]
    fn test_unknown_field_message() {
        let err = Error::UnknownField {
            table_id: Some("bqx7xxxx".into()),
            field_id: 12,
        };
        assert_eq!(err.to_string(), "field 12 not found in table 'bqx7xxxx'");
    }
}
