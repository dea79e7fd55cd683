use qbcli_core::{FieldId, QueryResult, Record, decode_query_result, encode_for_insert};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeSeq};
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::{Client, Error, Result, transport::Method};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRecordsInput {
    pub to: String,
    #[serde(serialize_with = "serialize_records")]
    pub data: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_field_id: Option<FieldId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields_to_return: Vec<FieldId>,
}

fn serialize_records<S: Serializer>(records: &[Record], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(records.len()))?;
    for record in records {
        seq.serialize_element(&encode_for_insert(record))?;
    }
    seq.end()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertMetadata {
    #[serde(default)]
    pub created_record_ids: Vec<u64>,
    #[serde(default)]
    pub updated_record_ids: Vec<u64>,
    #[serde(default)]
    pub unchanged_record_ids: Vec<u64>,
    #[serde(default)]
    pub total_number_of_records_processed: u64,
}

impl InsertMetadata {
    /// Fold the metadata of another batch into this one.
    pub fn merge(&mut self, other: InsertMetadata) {
        self.created_record_ids.extend(other.created_record_ids);
        self.updated_record_ids.extend(other.updated_record_ids);
        self.unchanged_record_ids.extend(other.unchanged_record_ids);
        self.total_number_of_records_processed += other.total_number_of_records_processed;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertRecordsOutput {
    /// Values of `fieldsToReturn`, in wire form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Map<String, Json>>,
    #[serde(default)]
    pub metadata: InsertMetadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortBy {
    pub field_id: FieldId,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBy {
    pub field_id: FieldId,
    pub grouping: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryOptions {
    pub skip: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecordsInput {
    pub from: String,
    pub select: Vec<FieldId>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<SortBy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<GroupBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<QueryOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordsOutput {
    #[serde(default)]
    pub number_deleted: u64,
}

impl Client {
    /// Insert or, with a merge field, upsert records.
    pub fn insert_records(&self, input: &InsertRecordsInput) -> Result<InsertRecordsOutput> {
        if input.data.is_empty() {
            return Err(Error::invalid_input("at least one record required"));
        }
        debug!(table = %input.to, records = input.data.len(), "inserting records");
        self.call(Method::Post, ["records"])
            .json(input)?
            .send("insert records")
    }

    /// Run a query and decode every cell through the codec.
    pub fn query_records(&self, input: &QueryRecordsInput) -> Result<QueryResult> {
        let body = self
            .call(Method::Post, ["records", "query"])
            .json(input)?
            .send_raw()?;
        Ok(decode_query_result(&body)?)
    }

    pub fn delete_records(&self, from: &str, filter: &str) -> Result<DeleteRecordsOutput> {
        if filter.trim().is_empty() {
            return Err(Error::invalid_input("a filter is required to delete records"));
        }
        self.call(Method::Delete, ["records"])
            .json(&serde_json::json!({ "from": from, "where": filter }))?
            .send("deleted records")
    }
}
