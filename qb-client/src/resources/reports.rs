use qbcli_core::{QueryResult, decode_query_result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::{Client, Result, transport::Method};

/// Report definition. The query and display properties vary by report type
/// and are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub report_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

impl Client {
    pub fn list_reports(&self, table_id: &str) -> Result<Vec<Report>> {
        self.call(Method::Get, ["reports"])
            .query("tableId", table_id)
            .send("reports")
    }

    pub fn get_report(&self, table_id: &str, report_id: &str) -> Result<Report> {
        self.call(Method::Get, ["reports", report_id])
            .query("tableId", table_id)
            .send("report")
    }

    /// Run a saved report. `top` of `None` leaves paging to the report.
    pub fn run_report(&self, table_id: &str, report_id: &str, skip: u64, top: Option<u64>) -> Result<QueryResult> {
        let mut call = self
            .call(Method::Post, ["reports", report_id, "run"])
            .query("tableId", table_id);
        if skip > 0 {
            call = call.query("skip", skip.to_string());
        }
        if let Some(top) = top {
            call = call.query("top", top.to_string());
        }
        let body = call.send_raw()?;
        Ok(decode_query_result(&body)?)
    }
}
