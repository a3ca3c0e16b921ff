//! The message model read by the payload builder.
//!
//! A [`Message`] is either plain (addresses, subject, bodies, headers and
//! attachments) or extended, in which case it also carries a
//! [`Transmission`] with campaign, tagging, metadata, substitution data and
//! send options. The builder only ever reads through [`MailMessage`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::address::{AddressList, EmailAddress};
use super::attachment::Attachment;
use super::options::SendOptions;

/// Free-form, string-keyed JSON data (metadata and substitution data).
pub type Data = serde_json::Map<String, serde_json::Value>;

/// Read access to a message, as consumed by the payload builder.
pub trait MailMessage {
    /// The sender (`From`).
    fn sender(&self) -> Option<&EmailAddress>;

    fn reply_to(&self) -> Option<&EmailAddress>;

    fn to(&self) -> &[EmailAddress];

    fn cc(&self) -> &[EmailAddress];

    fn bcc(&self) -> &[EmailAddress];

    /// Subject line, empty when unset.
    fn subject(&self) -> &str;

    fn html_body(&self) -> Option<&str>;

    fn text_body(&self) -> Option<&str>;

    /// Custom headers, in order. Structural headers (From, To, Subject, ...) are not included.
    fn headers(&self) -> &[Header];

    fn attachments(&self) -> &[Attachment];

    /// The transactional extensions, present only on an extended message.
    fn extensions(&self) -> Option<&Transmission> {
        None
    }
}

/// A custom header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Transactional-send extensions of a message.
///
/// Per-recipient lookups match the email address exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    campaign_id: Option<String>,
    tags: HashMap<String, Vec<String>>,
    metadata: Data,
    recipient_metadata: HashMap<String, Data>,
    substitution_data: Data,
    recipient_substitution_data: HashMap<String, Data>,
    options: SendOptions,
}

impl Default for Transmission {
    fn default() -> Self {
        Self {
            campaign_id: None,
            tags: HashMap::new(),
            metadata: Data::new(),
            recipient_metadata: HashMap::new(),
            substitution_data: Data::new(),
            recipient_substitution_data: HashMap::new(),
            options: SendOptions::transactional_defaults(),
        }
    }
}

impl Transmission {
    pub fn campaign_id(&self) -> Option<&str> {
        self.campaign_id.as_deref()
    }

    pub fn metadata(&self) -> &Data {
        &self.metadata
    }

    pub fn substitution_data(&self) -> &Data {
        &self.substitution_data
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }

    pub fn tags_for(&self, email: &str) -> Option<&[String]> {
        self.tags.get(email).map(Vec::as_slice)
    }

    pub fn metadata_for(&self, email: &str) -> Option<&Data> {
        self.recipient_metadata.get(email)
    }

    pub fn substitution_data_for(&self, email: &str) -> Option<&Data> {
        self.recipient_substitution_data.get(email)
    }

    pub fn set_campaign_id(&mut self, campaign_id: impl Into<String>) {
        self.campaign_id = Some(campaign_id.into());
    }

    /// Tags are kept exactly as given, duplicates included.
    pub fn set_tags_for<T: Into<String>>(
        &mut self,
        email: impl Into<String>,
        tags: impl IntoIterator<Item = T>,
    ) {
        self.tags
            .insert(email.into(), tags.into_iter().map(Into::into).collect());
    }

    pub fn set_metadata(&mut self, metadata: Data) {
        self.metadata = metadata;
    }

    pub fn set_metadata_for(&mut self, email: impl Into<String>, metadata: Data) {
        self.recipient_metadata.insert(email.into(), metadata);
    }

    pub fn set_substitution_data(&mut self, data: Data) {
        self.substitution_data = data;
    }

    pub fn set_substitution_data_for(&mut self, email: impl Into<String>, data: Data) {
        self.recipient_substitution_data.insert(email.into(), data);
    }

    /// Replace the whole option set, defaults included.
    pub fn set_options(&mut self, options: SendOptions) {
        self.options = options;
    }
}

/// An email message ready to be turned into a payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    from: Option<EmailAddress>,
    reply_to: Option<EmailAddress>,
    to: AddressList,
    cc: AddressList,
    bcc: AddressList,
    subject: String,
    html: Option<String>,
    text: Option<String>,
    headers: Vec<Header>,
    attachments: Vec<Attachment>,
    transmission: Option<Transmission>,
}

impl Message {
    /// A plain message. It never produces transmission fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// An extended message, starting with the default send options.
    pub fn extended() -> Self {
        Self {
            transmission: Some(Transmission::default()),
            ..Self::default()
        }
    }

    pub fn is_extended(&self) -> bool {
        self.transmission.is_some()
    }

    /// Promote to an extended message. Already-extended messages are returned unchanged.
    pub fn into_extended(mut self) -> Self {
        self.transmission_mut();
        self
    }

    /// Set the sender. A list keeps only its first address.
    pub fn with_from(mut self, from: impl Into<AddressList>) -> Self {
        self.from = from.into().into_first();
        self
    }

    /// Set the reply-to address. A list keeps only its first address.
    pub fn with_reply_to(mut self, reply_to: impl Into<AddressList>) -> Self {
        self.reply_to = reply_to.into().into_first();
        self
    }

    pub fn with_to(mut self, to: impl Into<AddressList>) -> Self {
        self.to = to.into();
        self
    }

    pub fn with_cc(mut self, cc: impl Into<AddressList>) -> Self {
        self.cc = cc.into();
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<AddressList>) -> Self {
        self.bcc = bcc.into();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_html_body(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_text_body(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Fill in the sender only when none is set.
    pub fn or_from(mut self, from: impl Into<AddressList>) -> Self {
        if self.from.is_none() {
            self.from = from.into().into_first();
        }
        self
    }

    /// Mutable access to the transmission extensions.
    ///
    /// A plain message becomes extended on first access.
    pub fn transmission_mut(&mut self) -> &mut Transmission {
        self.transmission.get_or_insert_with(Transmission::default)
    }

    pub fn with_campaign_id(mut self, campaign_id: impl Into<String>) -> Self {
        self.transmission_mut().set_campaign_id(campaign_id);
        self
    }

    pub fn with_tags_for<T: Into<String>>(
        mut self,
        email: impl Into<String>,
        tags: impl IntoIterator<Item = T>,
    ) -> Self {
        self.transmission_mut().set_tags_for(email, tags);
        self
    }

    pub fn with_metadata(mut self, metadata: Data) -> Self {
        self.transmission_mut().set_metadata(metadata);
        self
    }

    pub fn with_metadata_for(mut self, email: impl Into<String>, metadata: Data) -> Self {
        self.transmission_mut().set_metadata_for(email, metadata);
        self
    }

    pub fn with_substitution_data(mut self, data: Data) -> Self {
        self.transmission_mut().set_substitution_data(data);
        self
    }

    pub fn with_substitution_data_for(mut self, email: impl Into<String>, data: Data) -> Self {
        self.transmission_mut().set_substitution_data_for(email, data);
        self
    }

    pub fn with_options(mut self, options: SendOptions) -> Self {
        self.transmission_mut().set_options(options);
        self
    }
}

impl MailMessage for Message {
    fn sender(&self) -> Option<&EmailAddress> {
        self.from.as_ref()
    }

    fn reply_to(&self) -> Option<&EmailAddress> {
        self.reply_to.as_ref()
    }

    fn to(&self) -> &[EmailAddress] {
        self.to.as_slice()
    }

    fn cc(&self) -> &[EmailAddress] {
        self.cc.as_slice()
    }

    fn bcc(&self) -> &[EmailAddress] {
        self.bcc.as_slice()
    }

    fn subject(&self) -> &str {
        &self.subject
    }

    fn html_body(&self) -> Option<&str> {
        self.html.as_deref()
    }

    fn text_body(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn headers(&self) -> &[Header] {
        &self.headers
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    fn extensions(&self) -> Option<&Transmission> {
        self.transmission.as_ref()
    }
}
