//! Chat HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/chats               - Create a chat and send invitations
//! - GET  /api/v1/chats/{id}          - Fetch a chat (access-token check)
//! - POST /api/v1/chats/{id}/messages - Append a user message (+ AI turn)

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use blendchat_core::chat::service::{AppendMessage, AppendOutcome, NewChat};

use crate::http::error::AppError;
use crate::http::handlers::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::{AppState, ConcreteChatService};

/// Request body for chat creation.
#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub invited_emails: Vec<String>,
    pub message: String,
    #[serde(default)]
    pub include_assistant: bool,
    pub creator_email: String,
    #[serde(default)]
    pub creator_name: String,
}

/// Query parameters for the access-checked chat fetch.
#[derive(Debug, Deserialize)]
pub struct FetchChatQuery {
    pub email: Option<String>,
    pub token: Option<String>,
}

/// Request body for a message append.
#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub message: String,
    pub sender_email: String,
    #[serde(default)]
    pub sender_name: String,
}

/// Fall back to the address local part when no display name was supplied.
fn display_name(name: &str, email: &str) -> String {
    if name.trim().is_empty() {
        email.split('@').next().unwrap_or(email).to_string()
    } else {
        name.to_string()
    }
}

/// POST /api/v1/chats - Create a chat and send invitations.
pub async fn create_chat(
    State(state): State<AppState>,
    Json(body): Json<CreateChatRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let creator_name = display_name(&body.creator_name, &body.creator_email);
    let chat = state
        .chat_service
        .create_chat(NewChat {
            creator_email: body.creator_email,
            creator_name,
            invited_emails: body.invited_emails,
            message: body.message,
            include_assistant: body.include_assistant,
        })
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({
            "chat_id": chat.id.to_string(),
            "title": chat.title,
            "invited_emails": chat.invited_emails,
        }),
        request_id,
        elapsed,
    )
    .with_link("self", &format!("/api/v1/chats/{}", chat.id));

    Ok(Json(resp))
}

/// GET /api/v1/chats/{id} - Fetch a chat with the access-token check.
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(query): Query<FetchChatQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&chat_id)?;
    let chat = state
        .chat_service
        .fetch_chat(&id, query.email.as_deref(), query.token.as_deref())
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let chat_json =
        serde_json::to_value(&chat).map_err(|e| AppError::Internal(e.to_string()))?;
    let resp = ApiResponse::success(chat_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/chats/{}", chat.id))
        .with_link("messages", &format!("/api/v1/chats/{}/messages", chat.id));

    Ok(Json(resp))
}

/// POST /api/v1/chats/{id}/messages - Append a user message; an assistant
/// reply follows when the chat has its AI participant enabled.
pub async fn append_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(body): Json<AppendMessageRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&chat_id)?;
    let sender_name = display_name(&body.sender_name, &body.sender_email);
    let outcome = state
        .chat_service
        .append_user_message(
            &id,
            AppendMessage {
                text: body.message,
                sender_email: body.sender_email,
                sender_name,
            },
        )
        .await?;

    spawn_insights_refresh(&state.chat_service, id, &outcome);

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({
            "message": outcome.message,
            "assistant_message": outcome.assistant_message,
        }),
        request_id,
        elapsed,
    )
    .with_link("chat", &format!("/api/v1/chats/{id}"));

    Ok(Json(resp))
}

/// Fire the conversation analysis as a detached background task once an
/// append crosses the insights threshold. Outcomes are logged, never
/// surfaced: the reply path does not wait on analysis.
pub(crate) fn spawn_insights_refresh(
    service: &Arc<ConcreteChatService>,
    chat_id: Uuid,
    outcome: &AppendOutcome,
) {
    if !outcome.insights_due {
        return;
    }

    let service = Arc::clone(service);
    tokio::spawn(async move {
        match service.refresh_insights(&chat_id).await {
            Ok(true) => {
                tracing::info!(chat_id = %chat_id, "background insights refresh completed");
            }
            Ok(false) => {
                tracing::debug!(chat_id = %chat_id, "background insights refresh skipped");
            }
            Err(e) => {
                tracing::error!(chat_id = %chat_id, error = %e, "background insights refresh failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_local_part() {
        assert_eq!(display_name("Ada", "a@x.com"), "Ada");
        assert_eq!(display_name("", "a@x.com"), "a");
        assert_eq!(display_name("  ", "bea@x.com"), "bea");
    }

    #[test]
    fn test_create_request_defaults() {
        let body: CreateChatRequest = serde_json::from_str(
            r#"{"message": "hello", "creator_email": "a@x.com"}"#,
        )
        .unwrap();
        assert!(body.invited_emails.is_empty());
        assert!(!body.include_assistant);
        assert_eq!(body.creator_name, "");
    }
}
