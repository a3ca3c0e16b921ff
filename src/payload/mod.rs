//! The transmission payload and the builder that produces it.
//!
//! Every section that has nothing to say is left out of the serialized JSON
//! entirely; no `null`s and no empty containers are ever written.

pub mod builder;
pub mod placeholder;

use serde::Serialize;

use crate::error::Result;
use crate::model::{Data, EmailAddress, SendOptions};

pub use builder::build_payload;
pub use placeholder::translate_placeholders;

/// Request body for a transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub recipients: Vec<Recipient>,

    pub content: Content,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Data>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution_data: Option<Data>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SendOptions>,
}

impl Payload {
    /// Serialize to a JSON value tree.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to a JSON string, optionally pretty-printed.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// One delivery target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    pub address: RecipientAddress,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Data>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution_data: Option<Data>,
}

/// Recipient address in object form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientAddress {
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The address shown in the `To` header of a bcc copy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_to: Option<String>,
}

/// A sender: a bare email string, or `{email, name}` when a name is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Sender {
    Email(String),
    Named { email: String, name: String },
}

impl From<&EmailAddress> for Sender {
    fn from(address: &EmailAddress) -> Self {
        match address.name() {
            Some(name) => Self::Named {
                email: address.address.clone(),
                name: name.to_string(),
            },
            None => Self::Email(address.address.clone()),
        }
    }
}

/// The `content` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Content {
    pub subject: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Sender>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// `"Name: Value"` lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentPayload>,
}

/// An attachment with base64-encoded content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentPayload {
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
    pub data: String,
}
