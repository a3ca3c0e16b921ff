//! File attachments carried by a message.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Fallback content type when none is known.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file attached to a message. The content is held decoded, as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// MIME content type (e.g. `"image/jpeg"`, `"application/pdf"`).
    pub content_type: String,

    /// Filename shown to the recipient.
    pub filename: String,

    /// Raw, unencoded file content.
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(
        data: impl Into<Vec<u8>>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// The content encoded with standard, padded base64 and no line wrapping.
    pub fn base64_data(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// Size of the raw content in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_data() {
        let att = Attachment::new("Some text in a file.", "textfile.txt", "text/plain");
        assert_eq!(att.base64_data(), "U29tZSB0ZXh0IGluIGEgZmlsZS4=");
    }

    #[test]
    fn test_base64_binary_is_not_wrapped() {
        let att = Attachment::new(vec![0u8; 300], "zeros.bin", DEFAULT_CONTENT_TYPE);
        let encoded = att.base64_data();
        assert!(!encoded.contains('\n'));
        assert_eq!(encoded.len(), 400);
        assert_eq!(att.size(), 300);
    }
}
