use qbcli_core::User;
use serde::{Deserialize, Serialize};

use super::is_false;
use crate::{Client, Error, Result, transport::Method, xml::Param};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time_zone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_everyone_on_the_internet: bool,
    /// Set on apps created by copying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "assignToken", skip_serializing_if = "is_false")]
    pub assign_user_token: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateAppInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CopyAppInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub properties: CopyAppProperties,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyAppProperties {
    #[serde(skip_serializing_if = "is_false")]
    pub assign_user_token: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub exclude_files: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub keep_data: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub users_and_roles: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAppOutput {
    #[serde(default)]
    pub deleted_app_id: String,
}

/// An automation, pipeline or webhook attached to an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub owner: Option<User>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub table_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Filters for the apps the token can access.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListAppsInput {
    pub admin_only: bool,
    pub exclude_parents: bool,
    pub include_ancestors: bool,
    pub realm_apps_only: bool,
    pub with_embedded_tables: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GrantedDbs")]
pub struct ListAppsOutput {
    pub apps: Vec<AppInfo>,
}

/// `<databases><dbinfo>...</dbinfo></databases>`
#[derive(Deserialize)]
struct GrantedDbs {
    #[serde(default)]
    databases: Databases,
}

#[derive(Default, Deserialize)]
struct Databases {
    #[serde(default)]
    dbinfo: Vec<AppInfo>,
}

impl From<GrantedDbs> for ListAppsOutput {
    fn from(raw: GrantedDbs) -> Self {
        Self {
            apps: raw.databases.dbinfo,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(rename(serialize = "appId", deserialize = "dbid"), default)]
    pub id: String,
    #[serde(rename(serialize = "name", deserialize = "dbname"), default)]
    pub name: String,
    #[serde(
        rename(serialize = "ancestorAppId", deserialize = "ancestorappid"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub ancestor_app_id: String,
    #[serde(
        rename(serialize = "oldestAncestorAppId", deserialize = "oldestancestorappid"),
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub oldest_ancestor_app_id: String,
}

impl Client {
    pub fn get_app(&self, app_id: &str) -> Result<App> {
        self.call(Method::Get, ["apps", app_id]).send("app")
    }

    pub fn create_app(&self, input: &CreateAppInput) -> Result<App> {
        if input.name.is_empty() {
            return Err(Error::invalid_input("app name required"));
        }
        self.call(Method::Post, ["apps"]).json(input)?.send("app")
    }

    pub fn update_app(&self, app_id: &str, input: &UpdateAppInput) -> Result<App> {
        self.call(Method::Post, ["apps", app_id]).json(input)?.send("app")
    }

    /// Delete an app. The API insists on the app's name as confirmation.
    pub fn delete_app(&self, app_id: &str, name: &str) -> Result<DeleteAppOutput> {
        if name.is_empty() {
            return Err(Error::invalid_input("app name required to delete an app"));
        }
        self.call(Method::Delete, ["apps", app_id])
            .json(&serde_json::json!({ "name": name }))?
            .send("deleted app")
    }

    pub fn copy_app(&self, app_id: &str, input: &CopyAppInput) -> Result<App> {
        if input.name.is_empty() {
            return Err(Error::invalid_input("app name required"));
        }
        self.call(Method::Post, ["apps", app_id, "copy"])
            .json(input)?
            .send("copied app")
    }

    pub fn list_app_events(&self, app_id: &str) -> Result<Vec<AppEvent>> {
        self.call(Method::Get, ["apps", app_id, "events"])
            .send("app events")
    }

    /// List the apps the token can access, through `API_GrantedDBs`.
    pub fn list_apps(&self, input: &ListAppsInput) -> Result<ListAppsOutput> {
        let flag = |on: bool| Param::Text(if on { "1" } else { "0" }.to_string());
        let mut params = vec![("withembeddedtables", flag(input.with_embedded_tables))];
        for (name, on) in [
            ("adminOnly", input.admin_only),
            ("excludeparents", input.exclude_parents),
            ("includeancestors", input.include_ancestors),
            ("realmAppsOnly", input.realm_apps_only),
        ] {
            if on {
                params.push((name, flag(true)));
            }
        }
        self.xml_call("main", "API_GrantedDBs", &params)
    }
}
