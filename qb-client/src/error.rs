use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for qbcli-client operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("run 'qb config setup' to create a profile"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration")]
    #[diagnostic(code(qb::config_parse))]
    ConfigParse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode configuration")]
    ConfigEncode {
        #[source]
        source: toml::ser::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(qb::invalid_config))]
    InvalidConfig {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(qb::invalid_input))]
    InvalidInput { message: String },

    #[error("request to {url} failed after {attempts} attempt(s)")]
    #[diagnostic(code(qb::transport))]
    Http {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message} (HTTP {status})")]
    #[diagnostic(code(qb::client_error))]
    Client {
        status: u16,
        message: String,
        #[help]
        description: Option<String>,
    },

    #[error("{message} (HTTP {status})")]
    #[diagnostic(code(qb::service_error))]
    Service {
        status: u16,
        message: String,
        #[help]
        description: Option<String>,
    },

    #[error("{action} failed: {message} (errcode {code})")]
    #[diagnostic(code(qb::xml_api_error))]
    XmlApi {
        action: String,
        code: i32,
        status: u16,
        message: String,
        #[help]
        detail: Option<String>,
    },

    #[error("failed to decode {what} response")]
    #[diagnostic(code(qb::decode_error))]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode XML response")]
    #[diagnostic(code(qb::decode_error))]
    XmlDecode {
        #[source]
        source: quick_xml::DeError,
    },

    #[error("failed to encode XML request: {message}")]
    XmlEncode { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] qbcli_core::Error),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Box<Self> {
        Box::new(Self::InvalidInput {
            message: message.into(),
        })
    }

    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. }
            | Self::Service { status, .. }
            | Self::XmlApi { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether repeating the request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Service { .. } | Self::Http { .. } => true,
            Self::XmlApi { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<Box<qbcli_core::Error>> for Box<Error> {
    fn from(err: Box<qbcli_core::Error>) -> Self {
        Box::new(Error::Core(*err))
    }
}

/// HTTP status for an XML API error code.
///
/// Code 2 is used for both bad input and missing records, so the detail
/// message decides between 404 and 400.
pub fn status_for_errcode(code: i32, detail: &str) -> u16 {
    match code {
        1 => 500,
        2 if detail.contains("not found") => 404,
        2 => 400,
        3 | 7 | 19 | 23 | 24 | 29 | 34 | 38 | 70 | 71 | 73 | 74 | 77 | 78 | 114 | 150 | 151
        | 152 => 403,
        4 | 13 | 20 | 21 | 22 | 27 | 28 | 83 => 401,
        5 => 406,
        6 | 8..=12 | 14 | 15 | 25 | 26 | 50..=53 | 75 | 76 | 80 | 87 | 102 | 103 | 110 => 400,
        30..=33 | 35 | 37 | 54 | 81 | 112 => 404,
        36 | 84 | 85 => 500,
        60 | 61 => 409,
        82 => 504,
        100 | 101 | 105 => 503,
        104 => 429,
        111 | 113 => 422,
        _ => 400,
    }
}
