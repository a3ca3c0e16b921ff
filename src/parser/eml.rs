//! Adapter from raw `.eml` files (RFC 5322 messages) to [`Message`].
//!
//! Parsing is done by `mail-parser`; this module only picks out the pieces
//! a transmission needs.

use std::path::Path;

use mail_parser::{Address, Header, HeaderValue, MessageParser, MimeHeaders, PartType};

use crate::error::{PayloadError, Result};
use crate::model::attachment::DEFAULT_CONTENT_TYPE;
use crate::model::{AddressList, Attachment, EmailAddress, Message};

/// Headers already represented elsewhere in the payload, or owned by the MIME structure.
const STRUCTURAL_HEADERS: &[&str] = &[
    "from",
    "sender",
    "reply-to",
    "to",
    "cc",
    "bcc",
    "subject",
    "date",
    "message-id",
    "mime-version",
    "content-type",
    "content-transfer-encoding",
    "content-disposition",
    "content-id",
    "return-path",
    "received",
];

/// Read an `.eml` file from disk and convert it to a plain [`Message`].
pub fn load_eml(path: impl AsRef<Path>) -> Result<Message> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| PayloadError::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "Read EML file");
    parse_eml(&data)
}

/// Convert raw message bytes to a plain [`Message`].
///
/// A leading BOM and an MBOX `From ` separator line are skipped.
pub fn parse_eml(raw: &[u8]) -> Result<Message> {
    let bytes = skip_from_line(raw);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(PayloadError::Eml("empty message".into()));
    }

    let msg = MessageParser::default()
        .parse(bytes)
        .ok_or_else(|| PayloadError::Eml("not an RFC 5322 message".into()))?;

    let mut message = Message::new()
        .with_to(addresses(msg.to()))
        .with_cc(addresses(msg.cc()))
        .with_bcc(addresses(msg.bcc()))
        .with_subject(msg.subject().unwrap_or_default());

    if let Some(from) = addresses(msg.from()).into_first() {
        message = message.with_from(from);
    }
    if let Some(reply_to) = addresses(msg.reply_to()).into_first() {
        message = message.with_reply_to(reply_to);
    }

    // mail-parser synthesizes html from text (and the reverse); keep only real parts.
    let html = msg
        .html_body
        .first()
        .and_then(|&id| msg.parts.get(id as usize))
        .and_then(|part| match &part.body {
            PartType::Html(html) => Some(html.to_string()),
            _ => None,
        });
    let text = msg
        .text_body
        .first()
        .and_then(|&id| msg.parts.get(id as usize))
        .and_then(|part| match &part.body {
            PartType::Text(text) => Some(text.to_string()),
            _ => None,
        });
    if let Some(html) = html {
        message = message.with_html_body(html);
    }
    if let Some(text) = text {
        message = message.with_text_body(text);
    }

    for header in msg.headers() {
        let name = header.name();
        if is_structural(name) {
            continue;
        }
        match header_value(bytes, header) {
            Some(value) => message = message.with_header(name, value),
            None => tracing::debug!(header = name, "Skipping header with no value"),
        }
    }

    for (idx, part) in msg.attachments().enumerate() {
        let filename = part
            .attachment_name()
            .map(String::from)
            .unwrap_or_else(|| format!("attachment_{idx}"));

        let content_type = part
            .content_type()
            .map(|ct: &mail_parser::ContentType| {
                let main = ct.ctype();
                match ct.subtype() {
                    Some(sub) => format!("{main}/{sub}"),
                    None => main.to_string(),
                }
            })
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let attachment = Attachment::new(part.contents().to_vec(), filename, content_type);
        tracing::debug!(
            filename = %attachment.filename,
            bytes = attachment.size(),
            "Found attachment"
        );
        message = message.with_attachment(attachment);
    }

    Ok(message)
}

/// Flatten an address header (including groups) into an [`AddressList`].
fn addresses(address: Option<&Address<'_>>) -> AddressList {
    address
        .map(|a| a.clone().into_list())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|addr| {
            let email = addr.address?.into_owned();
            Some(match addr.name {
                Some(name) => EmailAddress::with_name(email, name.into_owned()),
                None => EmailAddress::new(email),
            })
        })
        .collect()
}

/// The header's value as written, unfolded and trimmed.
///
/// Encoded words in unstructured headers (e.g. `Comments`) are the one case
/// where the parsed value is used instead, so they reach the payload decoded.
fn header_value(raw: &[u8], header: &Header<'_>) -> Option<String> {
    let parsed = match header.value() {
        HeaderValue::Text(text) => Some(text.trim()),
        _ => None,
    };
    let Some(slice) = raw.get(header.offset_start()..header.offset_end()) else {
        return parsed.map(String::from);
    };

    let value = unfold(&String::from_utf8_lossy(slice));
    match parsed {
        Some(decoded) if value.contains("=?") => Some(decoded.to_string()),
        _ => (!value.is_empty()).then_some(value),
    }
}

/// Join folded header lines (CRLF followed by whitespace) and trim the result.
fn unfold(value: &str) -> String {
    value.replace("\r\n", "").replace('\n', "").trim().to_string()
}

fn is_structural(name: &str) -> bool {
    STRUCTURAL_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// Skip the `From ` separator line at the start of MBOX messages.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MailMessage;

    #[test]
    fn test_skip_from_line() {
        let data = b"From user@example.com Thu Jan 01 00:00:00 2024\nSubject: Test\n\nBody\n";
        assert!(skip_from_line(data).starts_with(b"Subject:"));
    }

    #[test]
    fn test_skip_bom() {
        let data = b"\xEF\xBB\xBFSubject: Test\n\nBody\n";
        assert!(skip_from_line(data).starts_with(b"Subject:"));
    }

    #[test]
    fn test_structural_headers() {
        assert!(is_structural("Content-Type"));
        assert!(is_structural("MESSAGE-ID"));
        assert!(!is_structural("X-Mailer"));
        assert!(!is_structural("List-Unsubscribe"));
    }

    #[test]
    fn test_plain_text_message() {
        let raw = b"From: Me <me@domain.com>\r\n\
To: john@doe.com\r\n\
Subject: Hello there!\r\n\
\r\n\
This is a special message just for you.\r\n";
        let msg = parse_eml(raw).unwrap();
        assert!(!msg.is_extended());
        assert_eq!(msg.sender(), Some(&EmailAddress::with_name("me@domain.com", "Me")));
        assert_eq!(msg.to(), &[EmailAddress::new("john@doe.com")]);
        assert_eq!(msg.subject(), "Hello there!");
        assert_eq!(msg.html_body(), None);
        assert!(msg
            .text_body()
            .is_some_and(|t| t.contains("special message")));
    }

    #[test]
    fn test_unfold() {
        assert_eq!(
            unfold(" <a@domain.com>\r\n <b@domain.com>\r\n"),
            "<a@domain.com> <b@domain.com>"
        );
        assert_eq!(unfold(" 1\n"), "1");
    }

    #[test]
    fn test_headers_keep_their_written_value() {
        let raw = b"From: me@domain.com\r\n\
To: john@doe.com\r\n\
Subject: Headers\r\n\
X-Custom: some-custom-header\r\n\
List-Unsubscribe: <mailto:unsub@domain.com>\r\n\
In-Reply-To: <prev@domain.com>\r\n\
References: <a@domain.com>\r\n <b@domain.com>\r\n\
Keywords: alpha, beta\r\n\
X-Priority: 1\r\n\
X-Priority: 2\r\n\
\r\n\
Body\r\n";
        let msg = parse_eml(raw).unwrap();
        let lines: Vec<String> = msg.headers().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            [
                "X-Custom: some-custom-header",
                "List-Unsubscribe: <mailto:unsub@domain.com>",
                "In-Reply-To: <prev@domain.com>",
                "References: <a@domain.com> <b@domain.com>",
                "Keywords: alpha, beta",
                "X-Priority: 1",
                "X-Priority: 2",
            ]
        );
    }

    #[test]
    fn test_encoded_word_header_is_decoded() {
        let raw = b"To: john@doe.com\r\n\
Comments: =?utf-8?q?Ol=C3=A1?=\r\n\
X-Raw: =?utf-8?q?Ol=C3=A1?=\r\n\
\r\n\
Body\r\n";
        let msg = parse_eml(raw).unwrap();
        let lines: Vec<String> = msg.headers().iter().map(ToString::to_string).collect();
        assert_eq!(lines, ["Comments: Olá", "X-Raw: =?utf-8?q?Ol=C3=A1?="]);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(parse_eml(b"  \n"), Err(PayloadError::Eml(_))));
    }
}
