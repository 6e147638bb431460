//! The shapes a record can be handed over in.
//!
//! A transport layer (CalDAV, CardDAV, a local store) usually returns an
//! object carrying the raw text in a `data` member alongside metadata such
//! as the href and etag. The updater accepts that object directly, or the
//! raw text itself.

use serde::{Deserialize, Serialize};

use crate::error::{FieldPatchError, FieldPatchResult};
use crate::ics;

/// A calendar or address-book resource as a transport layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DavResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl DavResource {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// A copy of this resource carrying `data` instead, ready to be stored
    /// back. The original is left as it was.
    pub fn with_data(&self, data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..self.clone()
        }
    }
}

/// Borrowed input to an update.
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    /// Raw record text.
    Text(&'a str),
    /// Raw record bytes, expected to be UTF-8.
    Bytes(&'a [u8]),
    /// A JSON object with the record text in its `data` member. Other
    /// members are ignored.
    Object(&'a serde_json::Value),
    Resource(&'a DavResource),
}

impl<'a> Record<'a> {
    /// The record text, or `InvalidInput` when there is nothing to parse.
    pub fn text(&self) -> FieldPatchResult<&'a str> {
        match *self {
            Record::Text(text) => non_empty(text),
            Record::Bytes(bytes) => {
                if bytes.is_empty() {
                    return Err(empty_record());
                }
                Ok(ics::decode(bytes)?)
            }
            Record::Object(value) => {
                let object = value.as_object().ok_or_else(|| {
                    FieldPatchError::InvalidInput(
                        "expected record text or an object with a `data` string".into(),
                    )
                })?;
                match object.get("data") {
                    None | Some(serde_json::Value::Null) => Err(missing_data()),
                    Some(serde_json::Value::String(data)) => non_empty_data(data),
                    Some(_) => Err(FieldPatchError::InvalidInput(
                        "record object `data` must be a string".into(),
                    )),
                }
            }
            Record::Resource(resource) => match &resource.data {
                Some(data) => non_empty_data(data),
                None => Err(missing_data()),
            },
        }
    }
}

fn non_empty(text: &str) -> FieldPatchResult<&str> {
    if text.is_empty() {
        Err(empty_record())
    } else {
        Ok(text)
    }
}

fn non_empty_data(data: &str) -> FieldPatchResult<&str> {
    if data.is_empty() {
        Err(FieldPatchError::InvalidInput(
            "record object has an empty `data` string".into(),
        ))
    } else {
        Ok(data)
    }
}

fn empty_record() -> FieldPatchError {
    FieldPatchError::InvalidInput(
        "record is empty; expected record text or an object with a `data` string".into(),
    )
}

fn missing_data() -> FieldPatchError {
    FieldPatchError::InvalidInput("record object has no `data` string".into())
}

impl<'a> From<&'a str> for Record<'a> {
    fn from(text: &'a str) -> Self {
        Record::Text(text)
    }
}

impl<'a> From<&'a String> for Record<'a> {
    fn from(text: &'a String) -> Self {
        Record::Text(text)
    }
}

impl<'a> From<&'a [u8]> for Record<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Record::Bytes(bytes)
    }
}

impl<'a> From<&'a serde_json::Value> for Record<'a> {
    fn from(value: &'a serde_json::Value) -> Self {
        Record::Object(value)
    }
}

impl<'a> From<&'a DavResource> for Record<'a> {
    fn from(resource: &'a DavResource) -> Self {
        Record::Resource(resource)
    }
}
