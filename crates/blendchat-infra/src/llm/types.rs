//! OpenAI Chat Completions API types.
//!
//! These are wire-specific request/response structures for HTTP
//! communication with `/v1/chat/completions`. They are NOT the generic
//! completion types from blendchat-types -- those are provider-agnostic.

use blendchat_types::llm::{ChatTurn, CompletionRequest};
use serde::{Deserialize, Serialize};

/// Request body for the Chat Completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiChatRequest {
    pub model: String,
    pub messages: Vec<OpenAiWireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A single wire message: role string plus content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiWireMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl OpenAiChatRequest {
    /// Convert a generic [`CompletionRequest`] into wire form. The system
    /// instruction becomes the leading `system` message.
    pub fn from_request(request: &CompletionRequest) -> Self {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(OpenAiWireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|turn: &ChatTurn| {
            OpenAiWireMessage {
                role: turn.role.to_string(),
                content: turn.content.clone(),
            }
        }));

        Self {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

/// One completion choice in a response.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    pub message: OpenAiWireMessage,
}

/// Token usage reported by the endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// Response body from the Chat Completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChatResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<OpenAiChoice>,
    pub usage: Option<OpenAiUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blendchat_types::llm::MessageRole;

    #[test]
    fn test_request_puts_system_first() {
        let req = CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatTurn {
                role: MessageRole::User,
                content: "hello".to_string(),
            }],
            system: Some("You are helpful.".to_string()),
            max_tokens: Some(500),
            temperature: Some(0.7),
        };
        let wire = OpenAiChatRequest::from_request(&req);
        assert_eq!(wire.messages.len(), 2);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[1].role, "user");

        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 500);
    }

    #[test]
    fn test_request_without_system() {
        let req = CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatTurn {
                role: MessageRole::User,
                content: "hello".to_string(),
            }],
            system: None,
            max_tokens: None,
            temperature: None,
        };
        let wire = OpenAiChatRequest::from_request(&req);
        assert_eq!(wire.messages.len(), 1);

        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "model": "gpt-4o-mini",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "4"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 20, "completion_tokens": 1, "total_tokens": 21}
        }"#;
        let resp: OpenAiChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices[0].message.content, "4");
        assert_eq!(resp.usage.unwrap().prompt_tokens, 20);
    }

    #[test]
    fn test_response_missing_usage() {
        let json = r#"{
            "id": "chatcmpl-456",
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "hi"}}]
        }"#;
        let resp: OpenAiChatResponse = serde_json::from_str(json).unwrap();
        assert!(resp.usage.is_none());
    }
}
