use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::{Client, Error, Result, transport::Method};

/// A table. Properties this tool does not use are kept in `extra` so they
/// still show up in JSON output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_field_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singular_noun: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural_noun: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTableOutput {
    #[serde(default)]
    pub deleted_table_id: String,
}

impl Client {
    pub fn list_tables(&self, app_id: &str) -> Result<Vec<Table>> {
        self.call(Method::Get, ["tables"])
            .query("appId", app_id)
            .send("tables")
    }

    pub fn get_table(&self, app_id: &str, table_id: &str) -> Result<Table> {
        self.call(Method::Get, ["tables", table_id])
            .query("appId", app_id)
            .send("table")
    }

    pub fn create_table(&self, app_id: &str, input: &TableInput) -> Result<Table> {
        if input.name.as_deref().is_none_or(str::is_empty) {
            return Err(Error::invalid_input("table name required"));
        }
        self.call(Method::Post, ["tables"])
            .query("appId", app_id)
            .json(input)?
            .send("table")
    }

    pub fn update_table(&self, app_id: &str, table_id: &str, input: &TableInput) -> Result<Table> {
        self.call(Method::Post, ["tables", table_id])
            .query("appId", app_id)
            .json(input)?
            .send("table")
    }

    pub fn delete_table(&self, app_id: &str, table_id: &str) -> Result<DeleteTableOutput> {
        self.call(Method::Delete, ["tables", table_id])
            .query("appId", app_id)
            .send("deleted table")
    }
}
