use qbcli_core::{FieldDescriptor, FieldId, FieldType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::is_false;
use crate::{Client, Error, Result, transport::Method};

/// A field as returned by the fields endpoints.
///
/// `field_type` stays a string here; [`Field::descriptor`] is where it is
/// checked against the known types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<FieldProperties>,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

impl Field {
    pub fn descriptor(&self) -> Result<FieldDescriptor> {
        let field_type = FieldType::from_wire(&self.field_type).ok_or_else(|| {
            Box::new(Error::Core(qbcli_core::Error::UnsupportedType {
                name: self.field_type.clone(),
                field_id: Some(self.id),
            }))
        })?;
        Ok(FieldDescriptor {
            id: self.id,
            label: self.label.clone(),
            field_type,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_lines: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

impl FieldProperties {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_help: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub add_to_forms: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<FieldProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFieldsOutput {
    #[serde(default)]
    pub deleted_field_ids: Vec<FieldId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Client {
    pub fn list_fields(&self, table_id: &str) -> Result<Vec<Field>> {
        self.call(Method::Get, ["fields"])
            .query("tableId", table_id)
            .send("fields")
    }

    pub fn get_field(&self, table_id: &str, field_id: FieldId) -> Result<Field> {
        self.call(Method::Get, ["fields", &field_id.to_string()])
            .query("tableId", table_id)
            .send("field")
    }

    /// Create a field. The type accepts the same aliases as the rest of the
    /// tool (`numeric`, `datetime`, ...) and is sent under its API name.
    pub fn create_field(&self, table_id: &str, input: &FieldInput) -> Result<Field> {
        if input.label.as_deref().is_none_or(str::is_empty) {
            return Err(Error::invalid_input("field label required"));
        }
        let Some(name) = input.field_type.as_deref() else {
            return Err(Error::invalid_input("field type required"));
        };
        let field_type = FieldType::canonical(name)?;
        let input = FieldInput {
            field_type: Some(field_type.as_str().to_string()),
            ..input.clone()
        };
        self.call(Method::Post, ["fields"])
            .query("tableId", table_id)
            .json(&input)?
            .send("field")
    }

    pub fn update_field(&self, table_id: &str, field_id: FieldId, input: &FieldInput) -> Result<Field> {
        if input.field_type.is_some() {
            return Err(Error::invalid_input("the type of an existing field cannot be changed"));
        }
        self.call(Method::Post, ["fields", &field_id.to_string()])
            .query("tableId", table_id)
            .json(input)?
            .send("field")
    }

    pub fn delete_fields(&self, table_id: &str, field_ids: &[FieldId]) -> Result<DeleteFieldsOutput> {
        if field_ids.is_empty() {
            return Err(Error::invalid_input("at least one field id required"));
        }
        self.call(Method::Delete, ["fields"])
            .query("tableId", table_id)
            .json(&serde_json::json!({ "fieldIds": field_ids }))?
            .send("deleted fields")
    }
}
