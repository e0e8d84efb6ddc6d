//! Outbound email types and inbound-bridge address parsing.
//!
//! The inbound-email bridge delivers mail addressed to
//! `chat-<id>@<domain>`; `parse_chat_recipient` extracts the chat id from
//! such an address so bridge deployments share one tested implementation.

use serde::{Deserialize, Serialize};

/// One email to be delivered to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Errors from email-delivery operations.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("invalid recipient: '{0}'")]
    InvalidRecipient(String),

    #[error("no API credential configured")]
    MissingCredential,
}

/// Extract the chat id from a bridge recipient address of the form
/// `chat-<id>@<domain>`.
///
/// The id segment accepts the URL-safe alphabet (`[A-Za-z0-9_-]`), which
/// covers hyphenated UUIDs. Returns `None` for any other address shape.
pub fn parse_chat_recipient(recipient: &str) -> Option<&str> {
    let rest = recipient.strip_prefix("chat-")?;
    let (id, _domain) = rest.split_once('@')?;
    if id.is_empty()
        || !id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return None;
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_recipient_uuid() {
        let addr = "chat-0192d3a4-55aa-7bbb-8ccc-0123456789ab@blendchat.example";
        assert_eq!(
            parse_chat_recipient(addr),
            Some("0192d3a4-55aa-7bbb-8ccc-0123456789ab")
        );
    }

    #[test]
    fn test_parse_chat_recipient_rejects_other_shapes() {
        assert_eq!(parse_chat_recipient("support@blendchat.example"), None);
        assert_eq!(parse_chat_recipient("chat-@blendchat.example"), None);
        assert_eq!(parse_chat_recipient("chat-abc"), None);
        assert_eq!(parse_chat_recipient("chat-abc def@x.com"), None);
    }

    #[test]
    fn test_outbound_email_serde_roundtrip() {
        let email = OutboundEmail {
            to: "b@x.com".to_string(),
            subject: "Ada invited you to a group chat".to_string(),
            html: "<p>join</p>".to_string(),
        };
        let json = serde_json::to_string(&email).unwrap();
        let back: OutboundEmail = serde_json::from_str(&json).unwrap();
        assert_eq!(back, email);
    }

    #[test]
    fn test_email_error_display() {
        let err = EmailError::InvalidRecipient("not-an-address".to_string());
        assert_eq!(err.to_string(), "invalid recipient: 'not-an-address'");
    }
}
