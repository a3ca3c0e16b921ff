//! Message description files.
//!
//! A message can be described in TOML or JSON (`.json` files are read as
//! JSON, everything else as TOML):
//!
//! ```toml
//! from = { "me@domain.com" = "Me" }
//! to = ["john@doe.com"]
//! subject = "Hello *|NAME|*"
//! text = "Hi there"
//! attachments = [{ filename = "notes.txt", path = "notes.txt" }]
//!
//! [recipients."john@doe.com"]
//! tags = ["welcome"]
//! ```
//!
//! Attachment paths are resolved relative to the message file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PayloadError, Result};
use crate::model::attachment::DEFAULT_CONTENT_TYPE;
use crate::model::{AddressList, Attachment, Data, Header, Message, SendOptions};

/// Whether the file describes a plain or an extended message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Plain,
    #[default]
    Extended,
}

/// On-disk syntax of a message file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// The deserialized shape of a message file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageFile {
    pub kind: MessageKind,
    pub from: Option<AddressList>,
    pub reply_to: Option<AddressList>,
    pub to: AddressList,
    pub cc: AddressList,
    pub bcc: AddressList,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    pub headers: Vec<Header>,
    pub attachments: Vec<AttachmentFile>,
    pub campaign_id: Option<String>,
    pub metadata: Data,
    pub substitution_data: Data,
    pub options: Option<SendOptions>,
    /// Per-recipient data keyed by email address.
    pub recipients: BTreeMap<String, RecipientFile>,
}

/// An attachment entry: inline `content` or a `path` to read.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentFile {
    pub filename: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    pub content: Option<String>,
    pub path: Option<PathBuf>,
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

/// Per-recipient transmission data.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipientFile {
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Data>,
    pub substitution_data: Option<Data>,
}

/// Read and convert a message file.
pub fn load_message(path: impl AsRef<Path>) -> Result<Message> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| PayloadError::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "Read message file");
    parse_message(&source, FileFormat::from_path(path), path)
}

/// Parse message file `source`.
///
/// `path` is used in error messages and as the base for relative attachment paths.
pub fn parse_message(source: &str, format: FileFormat, path: &Path) -> Result<Message> {
    let file: MessageFile = match format {
        FileFormat::Toml => {
            toml::from_str(source).map_err(|e| PayloadError::invalid(path, e.to_string()))?
        }
        FileFormat::Json => {
            serde_json::from_str(source).map_err(|e| PayloadError::invalid(path, e.to_string()))?
        }
    };
    file.into_message(path)
}

impl MessageFile {
    fn has_transmission_fields(&self) -> bool {
        self.campaign_id.is_some()
            || !self.metadata.is_empty()
            || !self.substitution_data.is_empty()
            || self.options.is_some()
            || !self.recipients.is_empty()
    }

    /// Convert into a [`Message`], reading attachment files as needed.
    pub fn into_message(self, path: &Path) -> Result<Message> {
        if self.kind == MessageKind::Plain && self.has_transmission_fields() {
            return Err(PayloadError::invalid(
                path,
                "transmission fields require kind = \"extended\"",
            ));
        }

        let base_dir = path.parent().unwrap_or(Path::new("."));

        let mut message = match self.kind {
            MessageKind::Plain => Message::new(),
            MessageKind::Extended => Message::extended(),
        };

        if let Some(from) = self.from {
            message = message.with_from(from);
        }
        if let Some(reply_to) = self.reply_to {
            message = message.with_reply_to(reply_to);
        }
        message = message
            .with_to(self.to)
            .with_cc(self.cc)
            .with_bcc(self.bcc)
            .with_subject(self.subject);
        if let Some(html) = self.html {
            message = message.with_html_body(html);
        }
        if let Some(text) = self.text {
            message = message.with_text_body(text);
        }
        for header in self.headers {
            message = message.with_header(header.name, header.value);
        }
        for attachment in self.attachments {
            message = message.with_attachment(attachment.load(base_dir, path)?);
        }

        if self.kind == MessageKind::Plain {
            return Ok(message);
        }

        let transmission = message.transmission_mut();
        if let Some(campaign_id) = self.campaign_id {
            transmission.set_campaign_id(campaign_id);
        }
        transmission.set_metadata(self.metadata);
        transmission.set_substitution_data(self.substitution_data);
        if let Some(options) = self.options {
            transmission.set_options(options);
        }
        for (email, data) in self.recipients {
            if let Some(tags) = data.tags {
                transmission.set_tags_for(email.as_str(), tags);
            }
            if let Some(metadata) = data.metadata {
                transmission.set_metadata_for(email.as_str(), metadata);
            }
            if let Some(substitution_data) = data.substitution_data {
                transmission.set_substitution_data_for(email, substitution_data);
            }
        }

        Ok(message)
    }
}

impl AttachmentFile {
    fn load(self, base_dir: &Path, message_path: &Path) -> Result<Attachment> {
        let data = match (self.content, self.path) {
            (Some(content), None) => content.into_bytes(),
            (None, Some(rel)) => {
                let full = base_dir.join(rel);
                let data = std::fs::read(&full).map_err(|e| PayloadError::io(&full, e))?;
                tracing::debug!(
                    path = %full.display(),
                    size = data.len(),
                    "Loaded attachment"
                );
                data
            }
            _ => {
                return Err(PayloadError::invalid(
                    message_path,
                    format!(
                        "attachment '{}' needs exactly one of `content` or `path`",
                        self.filename
                    ),
                ))
            }
        };
        Ok(Attachment::new(data, self.filename, self.content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MailMessage;

    fn parse_toml(source: &str) -> Result<Message> {
        parse_message(source, FileFormat::Toml, Path::new("message.toml"))
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.json")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("a.JSON")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("a.toml")), FileFormat::Toml);
        assert_eq!(FileFormat::from_path(Path::new("message")), FileFormat::Toml);
    }

    #[test]
    fn test_minimal_file_is_extended() {
        let msg = parse_toml(r#"to = "john@doe.com""#).unwrap();
        assert!(msg.is_extended());
        assert_eq!(msg.to().len(), 1);
        assert_eq!(msg.subject(), "");
    }

    #[test]
    fn test_plain_kind() {
        let msg = parse_toml("kind = \"plain\"\nto = \"john@doe.com\"").unwrap();
        assert!(!msg.is_extended());
    }

    #[test]
    fn test_plain_kind_rejects_transmission_fields() {
        let err = parse_toml("kind = \"plain\"\nto = \"a@b.com\"\ncampaign_id = \"x\"").unwrap_err();
        assert!(matches!(err, PayloadError::InvalidMessage { .. }));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(parse_toml("too = \"john@doe.com\"").is_err());
        assert!(parse_toml("to = \"a@b.com\"\noptions = { start_time = \"now\" }").is_err());
    }

    #[test]
    fn test_inline_attachment_defaults_content_type() {
        let msg = parse_toml(
            r#"
to = "john@doe.com"
attachments = [{ filename = "a.bin", content = "abc" }]
"#,
        )
        .unwrap();
        let att = &msg.attachments()[0];
        assert_eq!(att.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(att.data, b"abc");
    }

    #[test]
    fn test_attachment_needs_content_or_path() {
        let err = parse_toml(
            r#"
to = "john@doe.com"
attachments = [{ filename = "a.bin" }]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("a.bin"));
    }

    #[test]
    fn test_recipient_blocks() {
        let msg = parse_toml(
            r#"
to = { "john@doe.com" = "John" }

[recipients."john@doe.com"]
tags = ["eget", "bibendum"]
metadata = { adipiscing = "elit" }
"#,
        )
        .unwrap();
        let ext = msg.extensions().unwrap();
        assert_eq!(ext.tags_for("john@doe.com").map(<[String]>::len), Some(2));
        assert!(ext.metadata_for("john@doe.com").is_some());
        assert!(ext.substitution_data_for("john@doe.com").is_none());
    }

    #[test]
    fn test_headers_keep_order() {
        let msg = parse_toml(
            r#"
to = "john@doe.com"
headers = [{ name = "X-B", value = "2" }, { name = "X-A", value = "1" }]
"#,
        )
        .unwrap();
        let names: Vec<_> = msg.headers().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["X-B", "X-A"]);
    }
}
