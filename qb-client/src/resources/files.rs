use base64::{Engine, engine::general_purpose::STANDARD};
use qbcli_core::{FieldId, User};
use serde::{Deserialize, Serialize};

use crate::{Client, Error, Result, transport::Method, xml::Param};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedFile {
    #[serde(default)]
    pub version_number: u32,
    #[serde(default)]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<User>,
}

/// A file to attach to a record through `API_UploadFile`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFileInput<'a> {
    pub record_id: u64,
    pub field_id: FieldId,
    pub file_name: &'a str,
    pub contents: &'a [u8],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UploadFileResponse")]
pub struct CreateFileOutput {
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(rename(serialize = "fieldId", deserialize = "@id"), default)]
    pub field_id: FieldId,
    #[serde(default)]
    pub url: String,
}

/// `<file_fields><field id="7"><url>...</url></field></file_fields>`
#[derive(Deserialize)]
struct UploadFileResponse {
    #[serde(default)]
    file_fields: FileFields,
}

#[derive(Default, Deserialize)]
struct FileFields {
    #[serde(default)]
    field: Vec<UploadedFile>,
}

impl From<UploadFileResponse> for CreateFileOutput {
    fn from(raw: UploadFileResponse) -> Self {
        Self {
            files: raw.file_fields.field,
        }
    }
}

impl Client {
    /// Upload a file attachment into a record, as a new version of the field.
    pub fn create_file(&self, table_id: &str, input: &CreateFileInput<'_>) -> Result<CreateFileOutput> {
        if input.record_id == 0 {
            return Err(Error::invalid_input("record ID required"));
        }
        if input.file_name.is_empty() {
            return Err(Error::invalid_input("file name required"));
        }
        let field = Param::Attributed {
            attributes: vec![
                ("fid", input.field_id.to_string()),
                ("filename", input.file_name.to_string()),
            ],
            text: STANDARD.encode(input.contents),
        };
        self.xml_call(
            table_id,
            "API_UploadFile",
            &[("rid", Param::Text(input.record_id.to_string())), ("field", field)],
        )
    }

    pub fn delete_file(
        &self,
        table_id: &str,
        record_id: u64,
        field_id: FieldId,
        version: u32,
    ) -> Result<DeletedFile> {
        let (record_id, field_id, version) =
            (record_id.to_string(), field_id.to_string(), version.to_string());
        self.call(Method::Delete, ["files", table_id, &record_id, &field_id, &version])
            .send("deleted file")
    }
}
