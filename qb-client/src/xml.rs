//! Request encoding and envelope checks for the legacy XML API.
//!
//! Every call posts a `<qdbapi>` document and every response comes back in a
//! `<qdbapi>` envelope carrying `errcode`, `errtext` and `errdetail`.

use std::fmt::Display;

use quick_xml::{
    Writer,
    events::{BytesCData, BytesEnd, BytesStart, BytesText, Event},
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{Error, Result, error::status_for_errcode};

const ROOT: &str = "qdbapi";

/// One child element of the request document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Text(String),
    /// Sent as a CDATA section, for HTML and other markup.
    CData(String),
    /// Text with attributes on the element, e.g. `<field fid="7">`.
    Attributed {
        attributes: Vec<(&'static str, String)>,
        text: String,
    },
}

/// Status fields present in every XML response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub errcode: i32,
    #[serde(default)]
    pub errtext: String,
    #[serde(default)]
    pub errdetail: String,
    #[serde(default)]
    pub udata: Option<String>,
}

fn encode_error(e: impl Display) -> Box<Error> {
    Box::new(Error::XmlEncode {
        message: e.to_string(),
    })
}

/// Build the `<qdbapi>` request body.
pub fn encode_request<'a, I>(user_token: Option<&str>, params: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a Param)>,
{
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Start(BytesStart::new(ROOT)))
        .map_err(encode_error)?;

    if let Some(token) = user_token {
        write_element(&mut writer, "usertoken", &Param::Text(token.to_string()))?;
    }
    for (name, param) in params {
        write_element(&mut writer, name, param)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(ROOT)))
        .map_err(encode_error)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, param: &Param) -> Result<()> {
    let mut start = BytesStart::new(name);
    if let Param::Attributed { attributes, .. } = param {
        start.extend_attributes(attributes.iter().map(|(key, value)| (*key, value.as_str())));
    }
    writer.write_event(Event::Start(start)).map_err(encode_error)?;
    let content = match param {
        // A CDATA section cannot contain its own terminator.
        Param::CData(text) if !text.contains("]]>") => Event::CData(BytesCData::new(text.as_str())),
        Param::CData(text) | Param::Text(text) | Param::Attributed { text, .. } => {
            Event::Text(BytesText::new(text))
        }
    };
    writer.write_event(content).map_err(encode_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(encode_error)?;
    Ok(())
}

/// Read the envelope and turn a non-zero `errcode` into an error.
pub fn check_envelope(action: &str, body: &str) -> Result<Envelope> {
    let envelope: Envelope =
        quick_xml::de::from_str(body).map_err(|source| Box::new(Error::XmlDecode { source }))?;
    if envelope.errcode == 0 {
        return Ok(envelope);
    }
    let detail = (!envelope.errdetail.is_empty()).then(|| envelope.errdetail.clone());
    Err(Box::new(Error::XmlApi {
        action: action.to_string(),
        code: envelope.errcode,
        status: status_for_errcode(envelope.errcode, &envelope.errdetail),
        message: envelope.errtext,
        detail,
    }))
}

/// Decode the action-specific part of a response.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    quick_xml::de::from_str(body).map_err(|source| Box::new(Error::XmlDecode { source }))
}
