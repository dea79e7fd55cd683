use qbcli_core::{FieldId, QueryResult};
use serde_json::Value as Json;

use super::{Report, Rows};

/// Query or report results, with field labels as column headers.
pub struct RecordsReport<'a> {
    result: &'a QueryResult,
}

impl<'a> RecordsReport<'a> {
    pub fn new(result: &'a QueryResult) -> Self {
        Self { result }
    }

    fn columns(&self) -> Vec<FieldId> {
        self.result.fields.iter().map(|f| f.id).collect()
    }
}

impl Report for RecordsReport<'_> {
    fn json(&self) -> Json {
        serde_json::to_value(self.result).unwrap_or(Json::Null)
    }

    fn rows(&self) -> Rows {
        let columns = self.columns();
        let headers = self
            .result
            .fields
            .iter()
            .map(|f| {
                if f.label.is_empty() {
                    f.id.to_string()
                } else {
                    f.label.clone()
                }
            })
            .collect();
        let rows = self
            .result
            .records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|id| record.get(*id).map(ToString::to_string).unwrap_or_default())
                    .collect()
            })
            .collect();
        Rows { headers, rows }
    }
}

#[cfg(test)]
mod tests {
    use qbcli_core::decode_query_result;

    use super::*;
    use crate::reports::{Output, OutputFormat, TerminalOutput};

    fn result() -> QueryResult {
        decode_query_result(
            br#"{
                "fields": [
                    {"id": 3, "label": "Record ID#", "type": "recordid"},
                    {"id": 6, "label": "Title", "type": "text"},
                    {"id": 7, "label": "Tags", "type": "multitext"},
                    {"id": 8, "label": "Due", "type": "date"}
                ],
                "data": [
                    {"3": {"value": 1}, "6": {"value": "Write, then ship"}, "7": {"value": ["a", "b"]}, "8": {"value": "2024-06-30"}},
                    {"3": {"value": 2}, "6": {"value": "Rest"}}
                ],
                "metadata": {"totalRecords": 2, "numRecords": 2, "numFields": 4, "skip": 0}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_rows_use_labels_and_string_form() {
        let result = result();
        let rows = RecordsReport::new(&result).rows();
        assert_eq!(rows.headers, ["Record ID#", "Title", "Tags", "Due"]);
        assert_eq!(rows.rows[0], ["1", "Write, then ship", "a,b", "2024-06-30"]);
        assert_eq!(rows.rows[1], ["2", "Rest", "", ""]);
    }

    #[test]
    fn test_csv_output() {
        let result = result();
        let mut buf = Vec::new();
        TerminalOutput::new(&mut buf, OutputFormat::Csv, false)
            .render(&RecordsReport::new(&result))
            .unwrap();
        insta::assert_snapshot!(String::from_utf8(buf).unwrap().trim_end(), @r#"
        Record ID#,Title,Tags,Due
        1,"Write, then ship","a,b",2024-06-30
        2,Rest,,
        "#);
    }

    #[test]
    fn test_quiet_output_is_empty() {
        let result = result();
        let mut buf = Vec::new();
        TerminalOutput::new(&mut buf, OutputFormat::Json, true)
            .render(&RecordsReport::new(&result))
            .unwrap();
        assert!(buf.is_empty());
    }
}
