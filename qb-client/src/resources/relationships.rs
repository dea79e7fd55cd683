use qbcli_core::FieldId;
use serde::{Deserialize, Serialize};

use super::is_false;
use crate::{Client, Error, Result, transport::Method};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub parent_table_id: String,
    #[serde(default)]
    pub child_table_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key_field: Option<RelationshipField>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_cross_app: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookup_fields: Vec<RelationshipField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary_fields: Vec<RelationshipField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipField {
    #[serde(default)]
    pub id: FieldId,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipMetadata {
    #[serde(default)]
    pub num_relationships: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub total_relationships: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRelationshipsOutput {
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RelationshipMetadata>,
}

/// A summary field to create on the parent table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryField {
    #[serde(rename = "summaryFid", skip_serializing_if = "Option::is_none")]
    pub summary_field_id: Option<FieldId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// `SUM`, `AVG`, `COUNT`, ...
    pub accumulation_type: String,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelationshipInput {
    pub parent_table_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key_field: Option<ForeignKeyLabel>,
    #[serde(rename = "lookupFieldIds", skip_serializing_if = "Vec::is_empty")]
    pub lookup_field_ids: Vec<FieldId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub summary_fields: Vec<SummaryField>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ForeignKeyLabel {
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRelationshipInput {
    #[serde(rename = "lookupFieldIds", skip_serializing_if = "Vec::is_empty")]
    pub lookup_field_ids: Vec<FieldId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub summary_fields: Vec<SummaryField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRelationshipOutput {
    #[serde(default)]
    pub relationship_id: u64,
}

impl Client {
    pub fn list_relationships(&self, child_table_id: &str) -> Result<ListRelationshipsOutput> {
        self.call(Method::Get, ["tables", child_table_id, "relationships"])
            .send("relationships")
    }

    pub fn create_relationship(
        &self,
        child_table_id: &str,
        input: &CreateRelationshipInput,
    ) -> Result<Relationship> {
        if input.parent_table_id.is_empty() {
            return Err(Error::invalid_input("parent table id required"));
        }
        self.call(Method::Post, ["tables", child_table_id, "relationship"])
            .json(input)?
            .send("relationship")
    }

    /// Add lookup and summary fields to an existing relationship.
    pub fn update_relationship(
        &self,
        child_table_id: &str,
        relationship_id: u64,
        input: &UpdateRelationshipInput,
    ) -> Result<Relationship> {
        if input.lookup_field_ids.is_empty() && input.summary_fields.is_empty() {
            return Err(Error::invalid_input("nothing to update, pass lookup or summary fields"));
        }
        self.call(
            Method::Post,
            ["tables", child_table_id, "relationship", &relationship_id.to_string()],
        )
        .json(input)?
        .send("relationship")
    }

    pub fn delete_relationship(
        &self,
        child_table_id: &str,
        relationship_id: u64,
    ) -> Result<DeleteRelationshipOutput> {
        self.call(
            Method::Delete,
            ["tables", child_table_id, "relationship", &relationship_id.to_string()],
        )
        .send("deleted relationship")
    }
}
