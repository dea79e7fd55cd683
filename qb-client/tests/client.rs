//! Client behaviour against an in-memory transport.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use qbcli_client::{
    Client, Error, Method, Profile, Request, Response, Result, Transport,
    resources::{
        apps::ListAppsInput,
        files::CreateFileInput,
        records::{InsertRecordsInput, QueryRecordsInput},
    },
};
use qbcli_core::{FieldType, Record, Value};

/// Replays canned responses and records every request.
#[derive(Clone, Default)]
struct FakeTransport {
    sent: Arc<Mutex<Vec<Request>>>,
    replies: Arc<Mutex<VecDeque<Response>>>,
}

impl FakeTransport {
    fn reply(&self, status: u16, body: &str) -> &Self {
        self.replies.lock().push_back(Response {
            status,
            body: body.as_bytes().to_vec(),
        });
        self
    }

    fn sent(&self) -> Vec<Request> {
        self.sent.lock().clone()
    }

    fn body(&self, index: usize) -> String {
        let sent = self.sent.lock();
        String::from_utf8(sent[index].body.clone().unwrap_or_default()).unwrap()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        self.sent.lock().push(request.clone());
        Ok(self.replies.lock().pop_front().unwrap_or(Response {
            status: 500,
            body: b"{\"message\":\"no reply queued\"}".to_vec(),
        }))
    }
}

fn profile() -> Profile {
    Profile {
        realm_hostname: Some("example.quickbase.com".into()),
        user_token: Some("b4ab2c_cwv3_d6e5f7g8h9j0k1m2n3p4q5r6s7t8".into()),
        ..Profile::default()
    }
}

fn client(transport: &FakeTransport) -> Client {
    Client::new(&profile(), transport.clone()).unwrap()
}

const FIELDS: &str = r#"[
    {"id": 3, "label": "Record ID#", "fieldType": "recordid"},
    {"id": 6, "label": "Title", "fieldType": "text"},
    {"id": 7, "label": "Done", "fieldType": "checkbox"},
    {"id": 8, "label": "Due", "fieldType": "date"}
]"#;

// ============================================================================
// JSON API
// ============================================================================

#[test]
fn test_json_request_headers() {
    let transport = FakeTransport::default();
    transport.reply(200, r#"{"id": "bqx", "name": "Projects"}"#);
    let app = client(&transport).get_app("bqx").unwrap();
    assert_eq!(app.name, "Projects");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let request = &sent[0];
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.as_str(), "https://api.quickbase.com/v1/apps/bqx");
    assert_eq!(request.headers["Content-Type"], "application/json");
    assert_eq!(request.headers["QB-Realm-Hostname"], "example.quickbase.com");
    assert_eq!(
        request.headers["Authorization"],
        "QB-USER-TOKEN b4ab2c_cwv3_d6e5f7g8h9j0k1m2n3p4q5r6s7t8"
    );
    assert!(request.headers["User-Agent"].starts_with("qbcli/"));
}

#[test]
fn test_temp_token_takes_precedence() {
    let transport = FakeTransport::default();
    transport.reply(200, "[]");
    let profile = Profile {
        temp_token: Some("temporary".into()),
        ..profile()
    };
    let client = Client::new(&profile, transport.clone()).unwrap();
    client.list_tables("bqx").unwrap();

    let request = &transport.sent()[0];
    assert_eq!(request.headers["Authorization"], "QB-TEMP-TOKEN temporary");
    assert_eq!(request.url.as_str(), "https://api.quickbase.com/v1/tables?appId=bqx");
}

#[test]
fn test_client_requires_valid_profile() {
    let err = Client::new(&Profile::default(), FakeTransport::default())
        .err()
        .unwrap();
    assert!(matches!(*err, Error::InvalidConfig { .. }));
}

#[test]
fn test_client_error_carries_api_message() {
    let transport = FakeTransport::default();
    transport.reply(
        401,
        r#"{"message": "Access denied", "description": "User token is invalid"}"#,
    );
    let err = client(&transport).get_app("bqx").unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!err.is_retryable());
    assert_eq!(err.to_string(), "Access denied (HTTP 401)");
}

#[test]
fn test_schema_is_fetched_once() {
    let transport = FakeTransport::default();
    transport.reply(200, FIELDS);
    let client = client(&transport);

    let first = client.table_schema("bqy").unwrap();
    let second = client.table_schema("bqy").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.type_of(7).unwrap(), FieldType::Checkbox);
    assert_eq!(transport.sent().len(), 1);
    assert_eq!(
        transport.sent()[0].url.as_str(),
        "https://api.quickbase.com/v1/fields?tableId=bqy"
    );
}

#[test]
fn test_schema_skips_fields_of_unknown_type() {
    let transport = FakeTransport::default();
    transport.reply(
        200,
        r#"[
            {"id": 3, "label": "Record ID#", "fieldType": "recordid"},
            {"id": 6, "label": "Title", "fieldType": "text"},
            {"id": 9, "label": "Hologram", "fieldType": "hologram"}
        ]"#,
    );
    let client = client(&transport);

    let schema = client.table_schema("bqx").unwrap();
    assert_eq!(schema.type_of(6).unwrap(), FieldType::Text);
    assert_eq!(schema.ids().collect::<Vec<_>>(), [3, 6]);
    assert!(schema.type_of(9).is_err());
}

#[test]
fn test_failed_schema_fetch_is_retried() {
    let transport = FakeTransport::default();
    transport.reply(503, "").reply(200, FIELDS);
    let client = client(&transport);

    assert!(client.table_schema("bqy").is_err());
    assert!(client.table_schema("bqy").is_ok());
    assert_eq!(transport.sent().len(), 2);
}

#[test]
fn test_insert_records_payload() {
    let transport = FakeTransport::default();
    transport.reply(
        200,
        r#"{"data": [], "metadata": {"createdRecordIds": [11], "totalNumberOfRecordsProcessed": 1}}"#,
    );
    let mut record = Record::new();
    record.set_value(8, Value::parse("2024-05-01", FieldType::Date).unwrap());
    let input = InsertRecordsInput {
        to: "bqy".into(),
        data: vec![record],
        merge_field_id: Some(3),
        fields_to_return: vec![3],
    };

    let output = client(&transport).insert_records(&input).unwrap();
    assert_eq!(output.metadata.created_record_ids, [11]);
    insta::assert_snapshot!(
        transport.body(0),
        @r#"{"to":"bqy","data":[{"8":{"value":"2024-05-01"}}],"mergeFieldId":3,"fieldsToReturn":[3]}"#
    );
}

#[test]
fn test_query_records_decodes_values() {
    let transport = FakeTransport::default();
    transport.reply(
        200,
        r#"{
            "data": [
                {"3": {"value": 1}, "6": {"value": "Write docs"}, "7": {"value": true}},
                {"3": {"value": 2}, "6": {"value": "Ship"}, "7": {"value": false}}
            ],
            "fields": [
                {"id": 3, "label": "Record ID#", "type": "recordid"},
                {"id": 6, "label": "Title", "type": "text"},
                {"id": 7, "label": "Done", "type": "checkbox"}
            ],
            "metadata": {"totalRecords": 2, "numRecords": 2, "numFields": 3, "skip": 0}
        }"#,
    );
    let input = QueryRecordsInput {
        from: "bqy".into(),
        select: vec![3, 6, 7],
        filter: Some(qbcli_client::query::parse_query("7=1")),
        ..QueryRecordsInput::default()
    };

    let result = client(&transport).query_records(&input).unwrap();
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[1].get(6).unwrap().as_str(), Some("Ship"));
    assert_eq!(result.records[0].get(7).unwrap().as_bool(), Some(true));
    assert_eq!(result.metadata.total_records, 2);
    insta::assert_snapshot!(
        transport.body(0),
        @r#"{"from":"bqy","select":[3,6,7],"where":"{\"7\".EX.\"1\"}"}"#
    );
}

#[test]
fn test_query_with_unknown_type_fails_whole_result() {
    let transport = FakeTransport::default();
    transport.reply(
        200,
        r#"{
            "data": [{"6": {"value": "x"}}],
            "fields": [{"id": 6, "label": "Odd", "type": "hologram"}],
            "metadata": {"totalRecords": 1, "numRecords": 1, "numFields": 1, "skip": 0}
        }"#,
    );
    let input = QueryRecordsInput {
        from: "bqy".into(),
        select: vec![6],
        ..QueryRecordsInput::default()
    };
    let err = client(&transport).query_records(&input).unwrap_err();
    assert!(matches!(
        *err,
        Error::Core(qbcli_core::Error::UnsupportedType { .. })
    ));
}

#[test]
fn test_user_token_calls_authenticate_as_target() {
    let transport = FakeTransport::default();
    transport.reply(200, r#"{"id": 42}"#);
    let output = client(&transport)
        .deactivate_user_token("zzzzzz_abcd_0000111122223333")
        .unwrap();
    assert_eq!(output.id, 42);
    assert_eq!(
        transport.sent()[0].headers["Authorization"],
        "QB-USER-TOKEN zzzzzz_abcd_0000111122223333"
    );
}

// ============================================================================
// XML API
// ============================================================================

#[test]
fn test_list_apps_via_granted_dbs() {
    let transport = FakeTransport::default();
    transport.reply(
        200,
        "<?xml version=\"1.0\" ?>\n<qdbapi><action>API_GrantedDBs</action><errcode>0</errcode>\
         <errtext>No error</errtext><databases>\
         <dbinfo><dbname>Projects</dbname><dbid>bqx</dbid></dbinfo>\
         <dbinfo><dbname>Projects: Tasks</dbname><dbid>bqy</dbid><ancestorappid>bqa</ancestorappid></dbinfo>\
         </databases></qdbapi>",
    );
    let output = client(&transport)
        .list_apps(&ListAppsInput {
            admin_only: true,
            ..ListAppsInput::default()
        })
        .unwrap();
    assert_eq!(output.apps.len(), 2);
    assert_eq!(output.apps[1].id, "bqy");
    assert_eq!(output.apps[1].ancestor_app_id, "bqa");

    let request = &transport.sent()[0];
    assert_eq!(request.url.as_str(), "https://example.quickbase.com/db/main");
    assert_eq!(request.headers["QUICKBASE-ACTION"], "API_GrantedDBs");
    assert_eq!(request.headers["Content-Type"], "application/xml");
    insta::assert_snapshot!(
        transport.body(0),
        @"<qdbapi><usertoken>b4ab2c_cwv3_d6e5f7g8h9j0k1m2n3p4q5r6s7t8</usertoken><withembeddedtables>0</withembeddedtables><adminOnly>1</adminOnly></qdbapi>"
    );
}

#[test]
fn test_variable_round_trip() {
    let transport = FakeTransport::default();
    transport
        .reply(
            200,
            "<qdbapi><action>API_SetDBvar</action><errcode>0</errcode><errtext>No error</errtext></qdbapi>",
        )
        .reply(
            200,
            "<qdbapi><action>API_GetDBvar</action><errcode>0</errcode><errtext>No error</errtext>\
             <value>blue</value></qdbapi>",
        );
    let client = client(&transport);

    client.set_variable("bqx", "theme", "blue").unwrap();
    let variable = client.get_variable("bqx", "theme").unwrap();
    assert_eq!(variable.value, "blue");
    assert_eq!(transport.sent()[1].headers["QUICKBASE-ACTION"], "API_GetDBvar");
}

#[test]
fn test_create_file_uploads_base64() {
    let transport = FakeTransport::default();
    transport.reply(
        200,
        "<qdbapi><action>API_UploadFile</action><errcode>0</errcode><errtext>No error</errtext>\
         <file_fields><field id=\"9\"><url>https://example.quickbase.com/up/bqy/a/r12/e9/v1</url></field>\
         </file_fields></qdbapi>",
    );
    let output = client(&transport)
        .create_file(
            "bqy",
            &CreateFileInput {
                record_id: 12,
                field_id: 9,
                file_name: "notes.txt",
                contents: b"hello",
            },
        )
        .unwrap();
    assert_eq!(output.files.len(), 1);
    assert_eq!(output.files[0].field_id, 9);
    assert!(output.files[0].url.ends_with("/v1"));

    let request = &transport.sent()[0];
    assert_eq!(request.url.as_str(), "https://example.quickbase.com/db/bqy");
    assert_eq!(request.headers["QUICKBASE-ACTION"], "API_UploadFile");
    insta::assert_snapshot!(
        transport.body(0),
        @r#"<qdbapi><usertoken>b4ab2c_cwv3_d6e5f7g8h9j0k1m2n3p4q5r6s7t8</usertoken><rid>12</rid><field fid="9" filename="notes.txt">aGVsbG8=</field></qdbapi>"#
    );
}

#[test]
fn test_create_file_requires_name() {
    let transport = FakeTransport::default();
    let err = client(&transport)
        .create_file(
            "bqy",
            &CreateFileInput {
                record_id: 12,
                field_id: 9,
                file_name: "",
                contents: b"hello",
            },
        )
        .unwrap_err();
    assert!(matches!(*err, Error::InvalidInput { .. }));
    assert!(transport.sent().is_empty());
}

#[test]
fn test_xml_error_code_maps_to_status() {
    let transport = FakeTransport::default();
    transport.reply(
        200,
        "<qdbapi><action>API_GetDBPage</action><errcode>4</errcode>\
         <errtext>User not authenticated</errtext></qdbapi>",
    );
    let err = client(&transport).get_page("bqx", "12").unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(matches!(*err, Error::XmlApi { code: 4, .. }));
}

#[test]
fn test_update_page_requires_id_or_name() {
    let transport = FakeTransport::default();
    let err = client(&transport)
        .update_page("bqx", None, None, "<p>hi</p>")
        .unwrap_err();
    assert_eq!(err.to_string(), "ID or name required");
    assert!(transport.sent().is_empty());
}
