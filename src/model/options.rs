//! Transmission send options.

use serde::{Deserialize, Serialize};

/// The send flags recognized by a transmission.
///
/// Unset flags are left out of the payload so the provider's own defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_tracking: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_tracking: Option<bool>,

    /// Transactional messages bypass unsubscribe handling at the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactional: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_suppression: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,

    /// Dedicated IP pool to send from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_pool: Option<String>,
}

impl SendOptions {
    /// The options an extended message starts with: `transactional` and `inline_css` on.
    pub fn transactional_defaults() -> Self {
        Self {
            transactional: Some(true),
            inline_css: Some(true),
            ..Self::default()
        }
    }

    /// `true` when no flag is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SendOptions::transactional_defaults();
        assert_eq!(opts.transactional, Some(true));
        assert_eq!(opts.inline_css, Some(true));
        assert_eq!(opts.sandbox, None);
        assert!(!opts.is_empty());
        assert!(SendOptions::default().is_empty());
    }

    #[test]
    fn test_serializes_only_set_flags() {
        let json = serde_json::to_string(&SendOptions::transactional_defaults()).unwrap();
        assert_eq!(json, r#"{"transactional":true,"inline_css":true}"#);
    }

    #[test]
    fn test_rejects_unknown_flags() {
        let parsed: Result<SendOptions, _> = serde_json::from_str(r#"{"start_time": "now"}"#);
        assert!(parsed.is_err());
    }
}
