//! Prompt assembly for assistant replies and conversation analysis.
//!
//! Builds the two completion requests this service issues: the group-chat
//! reply (bounded recent-context window plus the new message) and the
//! insights analysis (full transcript, JSON-only contract).

use blendchat_types::chat::{ActionItem, ChatInsights, Message};
use blendchat_types::llm::{ChatTurn, CompletionRequest, LlmError, MessageRole};
use serde::Deserialize;

/// System instruction for the assistant reply turn.
pub const REPLY_SYSTEM_PROMPT: &str = "You are a helpful AI assistant participating in a group chat.\n\n\
Your role is to:\n\
- Provide helpful, concise responses\n\
- Extract and summarize action items when asked\n\
- Offer suggestions and insights\n\
- Be professional but friendly\n\
- When appropriate, format your response with bullet points or numbered lists\n\n\
Keep responses focused and actionable.";

/// System instruction for the conversation-analysis turn.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are an AI assistant that analyzes group conversations and provides actionable insights.\n\n\
Your task is to analyze the conversation and return a JSON object with:\n\
- summary: A concise 2-3 sentence summary of the conversation\n\
- actionItems: Array of action items mentioned, each with text, completed, and assignedTo if mentioned\n\
- keyTopics: Array of main topics discussed (max 5)\n\n\
Return ONLY valid JSON, no markdown formatting.";

/// Placeholder appended as the assistant message when the completion
/// service fails; the user's own message is durable regardless.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I'm having trouble generating a response right now. Please try again.";

/// Render messages as transcript lines of the form `Name: text`.
fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.sender.display_name(), m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the assistant-reply request: the last `window` prior messages as
/// context plus the new user message.
pub fn reply_request(
    model: &str,
    history: &[Message],
    new_message: &str,
    window: usize,
) -> CompletionRequest {
    let start = history.len().saturating_sub(window);
    let context = transcript(&history[start..]);

    let content = format!(
        "Recent conversation:\n{context}\n\nNew message: {new_message}\n\nProvide a helpful response:"
    );

    CompletionRequest {
        model: model.to_string(),
        messages: vec![ChatTurn {
            role: MessageRole::User,
            content,
        }],
        system: Some(REPLY_SYSTEM_PROMPT.to_string()),
        max_tokens: Some(500),
        temperature: Some(0.7),
    }
}

/// Build the conversation-analysis request over the full transcript.
pub fn analysis_request(model: &str, messages: &[Message]) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: vec![ChatTurn {
            role: MessageRole::User,
            content: transcript(messages),
        }],
        system: Some(ANALYSIS_SYSTEM_PROMPT.to_string()),
        max_tokens: None,
        temperature: Some(0.3),
    }
}

#[derive(Debug, Deserialize)]
struct InsightsPayload {
    #[serde(default)]
    summary: String,
    #[serde(default, rename = "actionItems")]
    action_items: Vec<ActionItemPayload>,
    #[serde(default, rename = "keyTopics")]
    key_topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ActionItemPayload {
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(default, rename = "assignedTo")]
    assigned_to: Option<String>,
}

/// Strip a surrounding markdown code fence, which models emit despite the
/// JSON-only instruction.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the analysis response body into `ChatInsights`.
pub fn parse_insights(content: &str) -> Result<ChatInsights, LlmError> {
    let payload: InsightsPayload = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| LlmError::Deserialization(format!("invalid insights JSON: {e}")))?;

    Ok(ChatInsights {
        summary: payload.summary,
        action_items: payload
            .action_items
            .into_iter()
            .map(|item| ActionItem {
                text: item.text,
                completed: item.completed,
                assigned_to: item.assigned_to,
            })
            .collect(),
        tags: payload.key_topics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blendchat_types::chat::Sender;
    use chrono::Utc;
    use uuid::Uuid;

    fn message(name: &str, text: &str) -> Message {
        Message {
            id: Uuid::now_v7(),
            text: text.to_string(),
            created_at: Utc::now(),
            sender: Sender::User {
                email: format!("{}@x.com", name.to_lowercase()),
                name: name.to_string(),
                sentiment: None,
            },
        }
    }

    #[test]
    fn test_reply_request_bounds_context_window() {
        let history: Vec<Message> = (0..15).map(|i| message("Ada", &format!("m{i}"))).collect();
        let req = reply_request("gpt-4o-mini", &history, "what's next?", 10);

        let content = &req.messages[0].content;
        assert!(!content.contains("m4"), "older messages must be dropped");
        assert!(content.contains("m5"));
        assert!(content.contains("m14"));
        assert!(content.contains("New message: what's next?"));
        assert_eq!(req.max_tokens, Some(500));
    }

    #[test]
    fn test_reply_request_short_history() {
        let history = vec![message("Ada", "hello")];
        let req = reply_request("gpt-4o-mini", &history, "hi", 10);
        assert!(req.messages[0].content.contains("Ada: hello"));
        assert_eq!(req.system.as_deref(), Some(REPLY_SYSTEM_PROMPT));
    }

    #[test]
    fn test_analysis_request_uses_full_transcript() {
        let messages = vec![message("Ada", "hello"), message("Bea", "hi there")];
        let req = analysis_request("gpt-4o-mini", &messages);
        assert!(req.messages[0].content.contains("Ada: hello"));
        assert!(req.messages[0].content.contains("Bea: hi there"));
        assert_eq!(req.temperature, Some(0.3));
    }

    #[test]
    fn test_parse_insights_full_payload() {
        let json = r#"{
            "summary": "Planning the launch.",
            "actionItems": [
                {"text": "book the venue", "assignedTo": "Bea"},
                {"text": "send invites", "completed": true}
            ],
            "keyTopics": ["launch", "logistics"]
        }"#;
        let insights = parse_insights(json).unwrap();
        assert_eq!(insights.summary, "Planning the launch.");
        assert_eq!(insights.action_items.len(), 2);
        assert_eq!(insights.action_items[0].assigned_to.as_deref(), Some("Bea"));
        assert!(insights.action_items[1].completed);
        assert_eq!(insights.tags, vec!["launch", "logistics"]);
    }

    #[test]
    fn test_parse_insights_strips_code_fence() {
        let fenced = "```json\n{\"summary\": \"ok\"}\n```";
        let insights = parse_insights(fenced).unwrap();
        assert_eq!(insights.summary, "ok");
    }

    #[test]
    fn test_parse_insights_rejects_non_json() {
        let err = parse_insights("Sure! Here is the summary:").unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }
}
