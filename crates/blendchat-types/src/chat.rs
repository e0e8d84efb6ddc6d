//! Chat and message domain types for BlendChat.
//!
//! A `Chat` is an invite-based group conversation with an append-only
//! message log, per-participant access tokens, and optional AI-derived
//! insights. A `Message` is one turn in a chat; its sender metadata is a
//! closed tagged variant so each kind carries only the fields relevant
//! to it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentiment tag attached to user-authored messages.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (sentiment IN ('positive', 'negative', 'neutral'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("invalid sentiment: '{other}'")),
        }
    }
}

/// Who authored a message.
///
/// Each variant carries only the metadata relevant to that sender kind:
/// user and inbound-email messages have an address and display name,
/// assistant messages have neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sender", rename_all = "lowercase")]
pub enum Sender {
    User {
        email: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sentiment: Option<Sentiment>,
    },
    Assistant,
    /// Arrived through the inbound-email bridge.
    Email { email: String, name: String },
}

impl Sender {
    /// The sender kind column value (`user`, `assistant`, `email`).
    pub fn kind(&self) -> &'static str {
        match self {
            Sender::User { .. } => "user",
            Sender::Assistant => "assistant",
            Sender::Email { .. } => "email",
        }
    }

    /// Display name used when rendering a transcript line.
    pub fn display_name(&self) -> &str {
        match self {
            Sender::User { name, .. } | Sender::Email { name, .. } => name,
            Sender::Assistant => "Assistant",
        }
    }
}

/// One turn in a chat. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub sender: Sender,
}

/// An action item extracted by the conversation-analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// AI-derived annotations for a chat, refreshed by the analysis pass once
/// the conversation crosses the insights threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInsights {
    pub summary: String,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An invite-based group conversation.
///
/// Created once with all fields set atomically; mutated only by message
/// appends (which advance `updated_at`) and insight updates. Access tokens
/// never leave the service after the invitation emails are sent, so they
/// are excluded from serialized responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator_email: String,
    pub creator_name: String,
    pub invited_emails: Vec<String>,
    #[serde(default, skip_serializing)]
    pub access_tokens: HashMap<String, String>,
    pub include_assistant: bool,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<ChatInsights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Chat {
    /// Whether the chat's storage TTL has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
