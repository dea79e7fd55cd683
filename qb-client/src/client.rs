use std::sync::Arc;

use qbcli_core::{BoxError, FieldDescriptor, SchemaCache, SchemaSource, TableSchema};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::Url;

use crate::{
    Error, Result,
    config::Profile,
    transport::{Method, Request, Response, Transport},
    xml::{self, Param},
};

pub const DEFAULT_BASE_URL: &str = "https://api.quickbase.com/v1";

/// Error body returned by the JSON API.
#[derive(Debug, Default, Deserialize)]
struct ErrorProperties {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Authenticated access to one realm.
///
/// The client also memoises table schemas, so typed record operations fetch
/// each table's fields at most once.
pub struct Client {
    transport: Box<dyn Transport + Send + Sync>,
    realm_hostname: String,
    user_token: Option<String>,
    temp_token: Option<String>,
    base_url: Url,
    xml_base_url: Url,
    user_agent: String,
    schemas: SchemaCache,
}

impl Client {
    pub fn new(profile: &Profile, transport: impl Transport + Send + Sync + 'static) -> Result<Self> {
        profile.validate()?;
        let realm_hostname = profile.realm_hostname.clone().unwrap_or_default();
        Ok(Self {
            transport: Box::new(transport),
            base_url: parse_url(DEFAULT_BASE_URL)?,
            xml_base_url: parse_url(&format!("https://{realm_hostname}/db"))?,
            realm_hostname,
            user_token: profile.user_token.clone(),
            temp_token: profile.temp_token.clone(),
            user_agent: format!(
                "qbcli/{} ({} {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            schemas: SchemaCache::new(),
        })
    }

    /// Send JSON API calls somewhere other than `api.quickbase.com`.
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    pub fn realm_hostname(&self) -> &str {
        &self.realm_hostname
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    /// The field types of a table, fetched on first use.
    pub fn table_schema(&self, table_id: &str) -> Result<Arc<TableSchema>> {
        Ok(self.schemas.resolve(table_id, self)?)
    }

    pub(crate) fn call<I, S>(&self, method: Method, segments: I) -> Call<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Call {
            client: self,
            method,
            url: join_segments(&self.base_url, segments),
            body: None,
            user_token: None,
        }
    }

    fn json_request(&self, method: Method, url: Url, user_token: Option<&str>) -> Request {
        let request = Request::new(method, url)
            .header("Content-Type", "application/json")
            .header("QB-Realm-Hostname", &self.realm_hostname)
            .header("User-Agent", &self.user_agent);
        match (user_token, &self.temp_token, &self.user_token) {
            (Some(token), _, _) => request.header("Authorization", format!("QB-USER-TOKEN {token}")),
            (None, Some(token), _) => request.header("Authorization", format!("QB-TEMP-TOKEN {token}")),
            (None, None, Some(token)) => request.header("Authorization", format!("QB-USER-TOKEN {token}")),
            (None, None, None) => request,
        }
    }

    /// Post an XML API action to `/db/{dbid}` and decode its response.
    pub(crate) fn xml_call<T: DeserializeOwned>(
        &self,
        dbid: &str,
        action: &'static str,
        params: &[(&str, Param)],
    ) -> Result<T> {
        let Some(token) = self.user_token.as_deref() else {
            return Err(Box::new(Error::InvalidConfig {
                message: format!("{action} requires a user token"),
                help: Some("temporary tokens only work with the JSON API".into()),
            }));
        };
        let body = xml::encode_request(Some(token), params.iter().map(|(name, p)| (*name, p)))?;
        let request = Request::new(Method::Post, join_segments(&self.xml_base_url, [dbid]))
            .header("Content-Type", "application/xml")
            .header("QUICKBASE-ACTION", action)
            .header("User-Agent", &self.user_agent)
            .body(body);

        debug!(action, dbid, "xml api call");
        let response = self.transport.send(&request)?;
        check_status(&response)?;
        let body = String::from_utf8_lossy(&response.body);
        xml::check_envelope(action, &body)?;
        xml::decode(&body)
    }
}

impl SchemaSource for Client {
    fn fetch_table_schema(&self, table_id: &str) -> std::result::Result<Vec<FieldDescriptor>, BoxError> {
        let fields = self.list_fields(table_id).map_err(|e| -> BoxError { e })?;
        // Fields of a type this client predates stay out of the schema, so
        // only the commands that name them fail.
        Ok(fields
            .iter()
            .filter_map(|field| match field.descriptor() {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    warn!(table_id, field_id = field.id, "skipping field: {e}");
                    None
                }
            })
            .collect())
    }
}

/// A JSON API request under construction.
pub(crate) struct Call<'c> {
    client: &'c Client,
    method: Method,
    url: Url,
    body: Option<Vec<u8>>,
    user_token: Option<String>,
}

impl Call<'_> {
    pub fn query(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.url.query_pairs_mut().append_pair(key, value.as_ref());
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body).map_err(|source| Box::new(Error::Encode { source }))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Authenticate this call with a token other than the configured one.
    pub fn user_token(mut self, token: &str) -> Self {
        self.user_token = Some(token.to_string());
        self
    }

    pub fn send_raw(self) -> Result<Vec<u8>> {
        let mut request = self
            .client
            .json_request(self.method, self.url, self.user_token.as_deref());
        if let Some(body) = self.body {
            request = request.body(body);
        }
        debug!(method = request.method.as_str(), url = %request.url, "api call");
        let response = self.client.transport.send(&request)?;
        check_status(&response)?;
        Ok(response.body)
    }

    pub fn send<T: DeserializeOwned>(self, what: &'static str) -> Result<T> {
        let body = self.send_raw()?;
        serde_json::from_slice(&body).map_err(|source| Box::new(Error::Decode { what, source }))
    }
}

fn parse_url(s: &str) -> Result<Url> {
    Url::parse(s).map_err(|e| {
        Box::new(Error::InvalidConfig {
            message: format!("invalid URL '{s}': {e}"),
            help: None,
        })
    })
}

fn join_segments<I, S>(base: &Url, segments: I) -> Url
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Turn a non-2xx response into a client or service error.
fn check_status(response: &Response) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let status = response.status;
    let props: ErrorProperties = serde_json::from_slice(&response.body).unwrap_or_default();
    let message = props.message.filter(|m| !m.is_empty()).unwrap_or_else(|| {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unexpected status")
            .to_lowercase()
    });
    let description = props.description.filter(|d| !d.is_empty());
    if (400..500).contains(&status) {
        Err(Box::new(Error::Client {
            status,
            message,
            description,
        }))
    } else {
        Err(Box::new(Error::Service {
            status,
            message,
            description,
        }))
    }
}
