//! Summaries of CSV import and export runs.

use qbcli_client::resources::records::InsertMetadata;
use serde::Serialize;
use serde_json::{Value as Json, json};

use super::{Report, Rows};

/// Report data from exporting a table to CSV.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub table_id: String,
    /// Columns written, in order.
    pub field_ids: Vec<u32>,
    pub records_exported: u64,
    /// Query pages requested.
    pub pages: u32,
}

impl Report for ExportReport {
    fn json(&self) -> Json {
        serde_json::to_value(self).unwrap_or(Json::Null)
    }

    fn rows(&self) -> Rows {
        let fields = self
            .field_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Rows {
            headers: vec!["field".into(), "value".into()],
            rows: vec![
                vec!["tableId".into(), self.table_id.clone()],
                vec!["fieldIds".into(), fields],
                vec!["recordsExported".into(), self.records_exported.to_string()],
                vec!["pages".into(), self.pages.to_string()],
            ],
        }
    }
}

/// Report data from importing CSV rows into a table.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub table_id: String,
    pub rows_read: u64,
    pub batches: u32,
    pub metadata: InsertMetadata,
}

impl Report for ImportReport {
    fn json(&self) -> Json {
        json!({
            "tableId": self.table_id,
            "rowsRead": self.rows_read,
            "batches": self.batches,
            "metadata": self.metadata,
        })
    }

    fn rows(&self) -> Rows {
        let m = &self.metadata;
        Rows {
            headers: vec!["field".into(), "value".into()],
            rows: vec![
                vec!["tableId".into(), self.table_id.clone()],
                vec!["rowsRead".into(), self.rows_read.to_string()],
                vec!["batches".into(), self.batches.to_string()],
                vec!["created".into(), m.created_record_ids.len().to_string()],
                vec!["updated".into(), m.updated_record_ids.len().to_string()],
                vec!["unchanged".into(), m.unchanged_record_ids.len().to_string()],
                vec![
                    "processed".into(),
                    m.total_number_of_records_processed.to_string(),
                ],
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_rows_count_ids() {
        let report = ImportReport {
            table_id: "bqy".into(),
            rows_read: 3,
            batches: 2,
            metadata: InsertMetadata {
                created_record_ids: vec![10, 11],
                updated_record_ids: vec![4],
                unchanged_record_ids: vec![],
                total_number_of_records_processed: 3,
            },
        };
        let rows = report.rows();
        assert_eq!(rows.rows[3], ["created", "2"]);
        assert_eq!(rows.rows[4], ["updated", "1"]);
        assert_eq!(report.json()["metadata"]["createdRecordIds"], json!([10, 11]));
    }

    #[test]
    fn test_export_json() {
        let report = ExportReport {
            table_id: "bqy".into(),
            field_ids: vec![3, 6],
            records_exported: 12,
            pages: 2,
        };
        assert_eq!(
            report.json(),
            json!({"tableId": "bqy", "fieldIds": [3, 6], "recordsExported": 12, "pages": 2})
        );
        assert_eq!(report.rows().rows[1], ["fieldIds", "3,6"]);
    }
}
