//! Whole-record encoding for the insert, query and report endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as Json};

use crate::{
    Error, FieldId, FieldType, Record, Result, Value,
    schema::{FieldDescriptor, TableSchema},
};

/// Paging information returned with query and report results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub num_records: u64,
    #[serde(default)]
    pub num_fields: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u64>,
}

/// Decoded rows together with the field metadata that typed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub records: Vec<Record>,
    pub fields: Vec<FieldDescriptor>,
    pub metadata: Metadata,
}

impl QueryResult {
    pub fn field(&self, field_id: FieldId) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == field_id)
    }
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Payload<'a> {
            data: Vec<Map<String, Json>>,
            fields: &'a [FieldDescriptor],
            metadata: &'a Metadata,
        }

        Payload {
            data: self.records.iter().map(encode_for_insert).collect(),
            fields: &self.fields,
            metadata: &self.metadata,
        }
        .serialize(serializer)
    }
}

/// Encode a record as `{"<fid>": {"value": <wire value>}}`.
pub fn encode_for_insert(record: &Record) -> Map<String, Json> {
    record
        .iter()
        .map(|(id, value)| {
            let mut cell = Map::new();
            cell.insert("value".to_string(), value.to_wire());
            (id.to_string(), Json::Object(cell))
        })
        .collect()
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    data: Vec<Map<String, Json>>,
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Deserialize)]
struct RawField {
    id: FieldId,
    #[serde(default)]
    label: String,
    #[serde(rename = "type")]
    field_type: String,
}

/// Decode a records query or report run response.
///
/// Values carry no type of their own; types come from the `fields` array.
/// The first cell that fails to decode fails the whole response.
pub fn decode_query_result(payload: &[u8]) -> Result<QueryResult> {
    let raw: RawPayload = serde_json::from_slice(payload)?;

    let fields = raw
        .fields
        .into_iter()
        .map(|f| {
            let field_type =
                FieldType::from_wire(&f.field_type).ok_or_else(|| {
                    Box::new(Error::UnsupportedType {
                        name: f.field_type.clone(),
                        field_id: Some(f.id),
                    })
                })?;
            Ok(FieldDescriptor {
                id: f.id,
                label: f.label,
                field_type,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let types: HashMap<FieldId, FieldType> = fields.iter().map(|f| (f.id, f.field_type)).collect();

    let records = raw
        .data
        .iter()
        .map(|row| decode_row(row, &types))
        .collect::<Result<Vec<_>>>()?;

    Ok(QueryResult {
        records,
        fields,
        metadata: raw.metadata,
    })
}

fn decode_row(row: &Map<String, Json>, types: &HashMap<FieldId, FieldType>) -> Result<Record> {
    row.iter()
        .map(|(key, cell)| {
            let field_id: FieldId = key.parse().map_err(|_| {
                Box::new(Error::MalformedPayload {
                    reason: format!("'{key}' is not a field id"),
                })
            })?;
            let field_type = *types.get(&field_id).ok_or_else(|| {
                Box::new(Error::UnknownField {
                    table_id: None,
                    field_id,
                })
            })?;
            let fragment = match cell {
                Json::Object(cell) => cell.get("value"),
                Json::Null => None,
                _ => {
                    return Err(Error::invalid_value(field_type, "expected a {\"value\": ...} cell")
                        .with_field(field_id));
                }
            };
            let value =
                Value::from_wire(fragment, field_type).map_err(|e| e.with_field(field_id))?;
            Ok((field_id, value))
        })
        .collect()
}

/// Build a record from `(field id, raw string)` pairs using declared types.
pub fn build_record<I, S>(schema: &TableSchema, pairs: I) -> Result<Record>
where
    I: IntoIterator<Item = (FieldId, S)>,
    S: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(field_id, raw)| {
            let field_type = schema.type_of(field_id)?;
            let value =
                Value::parse(raw.as_ref(), field_type).map_err(|e| e.with_field(field_id))?;
            Ok((field_id, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Json) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_decode_single_numeric() {
        let body = payload(json!({
            "fields": [{"id": 6, "label": "Amount", "type": "numeric"}],
            "data": [{"6": {"value": 42}}],
        }));
        let result = decode_query_result(&body).unwrap();
        assert_eq!(result.records.len(), 1);
        let value = result.records[0].get(6).unwrap();
        assert_eq!(value.field_type(), FieldType::Numeric);
        assert_eq!(value.as_f64(), Some(42.0));
    }

    #[test]
    fn test_decode_is_all_or_nothing() {
        let body = payload(json!({
            "fields": [
                {"id": 3, "label": "Record ID#", "type": "recordid"},
                {"id": 6, "label": "Amount", "type": "numeric"}
            ],
            "data": [
                {"3": {"value": 1}, "6": {"value": 10}},
                {"3": {"value": 2}, "6": {"value": 20}},
                {"3": {"value": 3}, "6": {"value": 30}},
                {"3": {"value": 4}, "6": {"value": "lots"}}
            ],
        }));
        let err = decode_query_result(&body).unwrap_err();
        assert!(matches!(*err, Error::InvalidValue { field_id: Some(6), .. }));
    }

    #[test]
    fn test_decode_unknown_field_id() {
        let body = payload(json!({
            "fields": [{"id": 6, "label": "Amount", "type": "numeric"}],
            "data": [{"7": {"value": 1}}],
        }));
        let err = decode_query_result(&body).unwrap_err();
        assert!(matches!(*err, Error::UnknownField { field_id: 7, .. }));
    }

    #[test]
    fn test_decode_unsupported_type() {
        let body = payload(json!({
            "fields": [{"id": 9, "label": "Shape", "type": "hologram"}],
            "data": [],
        }));
        let err = decode_query_result(&body).unwrap_err();
        assert!(matches!(*err, Error::UnsupportedType { field_id: Some(9), .. }));
    }

    #[test]
    fn test_decode_preserves_row_order_and_metadata() {
        let body = payload(json!({
            "fields": [{"id": 3, "label": "Record ID#", "type": "recordid"}],
            "data": [{"3": {"value": 9}}, {"3": {"value": 2}}, {"3": {"value": 5}}],
            "metadata": {"totalRecords": 10, "numRecords": 3, "numFields": 1, "skip": 0}
        }));
        let result = decode_query_result(&body).unwrap();
        let ids: Vec<_> = result
            .records
            .iter()
            .map(|r| r.get(3).and_then(Value::as_f64).unwrap())
            .collect();
        assert_eq!(ids, [9.0, 2.0, 5.0]);
        assert_eq!(result.metadata.total_records, 10);
        assert_eq!(result.metadata.top, None);
    }

    #[test]
    fn test_decode_missing_value_is_zero() {
        let body = payload(json!({
            "fields": [{"id": 8, "label": "Done", "type": "checkbox"}],
            "data": [{"8": {}}, {"8": {"value": null}}],
        }));
        let result = decode_query_result(&body).unwrap();
        for record in &result.records {
            assert_eq!(record.get(8).and_then(Value::as_bool), Some(false));
        }
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = decode_query_result(b"{\"data\": [").unwrap_err();
        assert!(matches!(*err, Error::Json { .. }));
    }

    #[test]
    fn test_encode_for_insert() {
        let mut record = Record::new();
        record
            .set_value(6, Value::text(FieldType::Text, "Widget").unwrap())
            .set_value(7, Value::numeric(3.0))
            .set_value(8, Value::multitext(vec!["a".into(), "b".into()]));
        let encoded = Json::Object(encode_for_insert(&record));
        assert_eq!(
            encoded,
            json!({
                "6": {"value": "Widget"},
                "7": {"value": 3},
                "8": {"value": ["a", "b"]},
            })
        );
    }

    #[test]
    fn test_build_record_uses_schema_types() {
        let schema = TableSchema::new(
            "bqx",
            [
                FieldDescriptor {
                    id: 6,
                    label: "Due".into(),
                    field_type: FieldType::Date,
                },
                FieldDescriptor {
                    id: 7,
                    label: "Done".into(),
                    field_type: FieldType::Checkbox,
                },
            ],
        );
        let record = build_record(&schema, [(6, "2024-05-01"), (7, "true")]).unwrap();
        assert_eq!(record.get(6).unwrap().to_string(), "2024-05-01");
        assert_eq!(record.get(7).and_then(Value::as_bool), Some(true));

        let err = build_record(&schema, [(7, "maybe")]).unwrap_err();
        assert_eq!(err.field_id(), Some(7));

        let err = build_record(&schema, [(9, "x")]).unwrap_err();
        assert!(matches!(*err, Error::UnknownField { field_id: 9, .. }));
    }
}
