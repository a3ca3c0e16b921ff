//! Builds a [`Payload`] from anything implementing [`MailMessage`].

use crate::error::{PayloadError, Result};
use crate::model::{Attachment, EmailAddress, MailMessage, Transmission};

use super::placeholder::translate_placeholders;
use super::{AttachmentPayload, Content, Payload, Recipient, RecipientAddress, Sender};

/// Build the transmission payload for `message`.
///
/// Recipients are emitted `to` first, then `cc`, then `bcc`. Every bcc entry
/// points its `header_to` at the first `to` address so the copy stays hidden.
///
/// # Errors
///
/// [`PayloadError::NoRecipient`] when the message has neither a `to` nor a
/// `cc` address.
pub fn build_payload<M: MailMessage + ?Sized>(message: &M) -> Result<Payload> {
    let transmission = message.extensions();

    let recipients = build_recipients(message, transmission)?;
    let content = build_content(message);

    let mut payload = Payload {
        recipients,
        content,
        campaign_id: None,
        metadata: None,
        substitution_data: None,
        options: None,
    };

    if let Some(transmission) = transmission {
        payload.campaign_id = transmission
            .campaign_id()
            .filter(|id| !id.is_empty())
            .map(String::from);
        payload.metadata = Some(transmission.metadata())
            .filter(|data| !data.is_empty())
            .cloned();
        payload.substitution_data = Some(transmission.substitution_data())
            .filter(|data| !data.is_empty())
            .cloned();
        payload.options = Some(transmission.options())
            .filter(|options| !options.is_empty())
            .cloned();
    }

    tracing::debug!(
        recipients = payload.recipients.len(),
        attachments = payload.content.attachments.len(),
        extended = transmission.is_some(),
        "Built transmission payload"
    );

    Ok(payload)
}

/// Assemble the recipient list, rejecting messages without a visible recipient.
fn build_recipients<M: MailMessage + ?Sized>(
    message: &M,
    transmission: Option<&Transmission>,
) -> Result<Vec<Recipient>> {
    let mut recipients: Vec<Recipient> = message
        .to()
        .iter()
        .chain(message.cc())
        .map(|address| recipient(address, None, transmission))
        .collect();

    if recipients.is_empty() {
        return Err(PayloadError::NoRecipient);
    }

    let header_to = message.to().first().map(|a| a.address.as_str());
    recipients.extend(
        message
            .bcc()
            .iter()
            .map(|address| recipient(address, header_to, transmission)),
    );

    Ok(recipients)
}

fn recipient(
    address: &EmailAddress,
    header_to: Option<&str>,
    transmission: Option<&Transmission>,
) -> Recipient {
    let email = address.address.as_str();
    Recipient {
        address: RecipientAddress {
            email: email.to_string(),
            name: address.name().map(String::from),
            header_to: header_to.map(String::from),
        },
        tags: transmission
            .and_then(|t| t.tags_for(email))
            .map(<[String]>::to_vec),
        metadata: transmission.and_then(|t| t.metadata_for(email)).cloned(),
        substitution_data: transmission
            .and_then(|t| t.substitution_data_for(email))
            .cloned(),
    }
}

fn build_content<M: MailMessage + ?Sized>(message: &M) -> Content {
    let html = message.html_body().map(translate_placeholders);

    // Without an html body the message is plain text, so `text` is always present.
    let text = match (message.text_body(), &html) {
        (Some(text), _) => Some(translate_placeholders(text)),
        (None, Some(_)) => None,
        (None, None) => Some(String::new()),
    };

    Content {
        subject: translate_placeholders(message.subject()),
        from: message.sender().map(Sender::from),
        reply_to: message.reply_to().map(|a| a.address.clone()),
        html,
        text,
        headers: message.headers().iter().map(ToString::to_string).collect(),
        attachments: message.attachments().iter().map(attachment).collect(),
    }
}

fn attachment(attachment: &Attachment) -> AttachmentPayload {
    AttachmentPayload {
        content_type: attachment.content_type.clone(),
        name: attachment.filename.clone(),
        data: attachment.base64_data(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, SendOptions};

    #[test]
    fn test_bcc_only_is_rejected() {
        let msg = Message::new()
            .with_from("me@domain.com")
            .with_bcc("jake@doe.com");
        assert!(matches!(build_payload(&msg), Err(PayloadError::NoRecipient)));
    }

    #[test]
    fn test_cc_alone_is_enough() {
        let msg = Message::new()
            .with_cc("jane@doe.com")
            .with_bcc("jake@doe.com");
        let payload = build_payload(&msg).unwrap();
        assert_eq!(payload.recipients.len(), 2);
        // No `to` address means nothing to point the bcc copy at.
        assert_eq!(payload.recipients[1].address.header_to, None);
    }

    #[test]
    fn test_header_to_uses_first_to_address() {
        let msg = Message::new()
            .with_to(["first@doe.com", "second@doe.com"])
            .with_cc("cc@doe.com")
            .with_bcc(["b1@doe.com", "b2@doe.com"]);
        let payload = build_payload(&msg).unwrap();

        let emails: Vec<_> = payload
            .recipients
            .iter()
            .map(|r| r.address.email.as_str())
            .collect();
        assert_eq!(
            emails,
            ["first@doe.com", "second@doe.com", "cc@doe.com", "b1@doe.com", "b2@doe.com"]
        );

        for r in &payload.recipients[..3] {
            assert_eq!(r.address.header_to, None);
        }
        for r in &payload.recipients[3..] {
            assert_eq!(r.address.header_to.as_deref(), Some("first@doe.com"));
        }
    }

    #[test]
    fn test_body_emission_rule() {
        let html_only = Message::new()
            .with_to("john@doe.com")
            .with_html_body("<p>Hi</p>");
        let content = build_payload(&html_only).unwrap().content;
        assert_eq!(content.html.as_deref(), Some("<p>Hi</p>"));
        assert_eq!(content.text, None);

        let no_body = Message::new().with_to("john@doe.com");
        let content = build_payload(&no_body).unwrap().content;
        assert_eq!(content.html, None);
        assert_eq!(content.text.as_deref(), Some(""));

        let both = html_only.with_text_body("Hi");
        let content = build_payload(&both).unwrap().content;
        assert_eq!(content.html.as_deref(), Some("<p>Hi</p>"));
        assert_eq!(content.text.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_reply_to_drops_name() {
        let msg = Message::new()
            .with_to("john@doe.com")
            .with_reply_to(("noreply@domain.com", "No Reply"));
        let content = build_payload(&msg).unwrap().content;
        assert_eq!(content.reply_to.as_deref(), Some("noreply@domain.com"));
    }

    #[test]
    fn test_plain_message_never_emits_transmission_fields() {
        let msg = Message::new().with_to("john@doe.com");
        let payload = build_payload(&msg).unwrap();
        assert_eq!(payload.options, None);
        assert_eq!(payload.campaign_id, None);
        assert_eq!(payload.metadata, None);
    }

    #[test]
    fn test_empty_option_set_is_omitted() {
        let msg = Message::extended()
            .with_to("john@doe.com")
            .with_options(SendOptions::default());
        assert_eq!(build_payload(&msg).unwrap().options, None);
    }

    #[test]
    fn test_empty_campaign_id_is_omitted() {
        let msg = Message::extended()
            .with_to("john@doe.com")
            .with_campaign_id("");
        assert_eq!(build_payload(&msg).unwrap().campaign_id, None);
    }
}
