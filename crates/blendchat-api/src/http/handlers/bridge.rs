//! Inbound-email bridge handler.
//!
//! POST /api/v1/chats/{id}/email
//!
//! The external mail receiver parses arriving email, extracts the chat id
//! from a `chat-<id>@<domain>` recipient address, and calls this endpoint
//! with the parsed sender and body. Requests carry the shared secret in the
//! `X-Bridge-Key` header; the secret is verified by SHA-256 comparison
//! before any store access, and a wrong or missing key is rejected as
//! Unauthorized.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use blendchat_core::chat::service::AppendMessage;

use crate::http::error::AppError;
use crate::http::handlers::{chat::spawn_insights_refresh, parse_uuid};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body posted by the mail receiver.
#[derive(Debug, Deserialize)]
pub struct BridgeAppendRequest {
    pub message: String,
    pub sender_email: String,
    #[serde(default)]
    pub sender_name: String,
}

/// Compute the SHA-256 hash of a bridge key (lowercase hex).
pub fn hash_bridge_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{:x}", digest)
}

/// Verify the `X-Bridge-Key` header against the configured shared secret.
fn verify_bridge_key(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(secret) = &state.config.bridge_secret else {
        return Err(AppError::Unauthorized(
            "Inbound-email bridge is not configured".to_string(),
        ));
    };

    let provided = headers
        .get("x-bridge-key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing X-Bridge-Key header".to_string()))?;

    if hash_bridge_key(provided.trim()) != hash_bridge_key(secret.expose_secret()) {
        return Err(AppError::Unauthorized("Invalid bridge key".to_string()));
    }

    Ok(())
}

/// POST /api/v1/chats/{id}/email - Append a message arriving by email.
pub async fn append_bridge_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<BridgeAppendRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    verify_bridge_key(&state, &headers)?;

    let id = parse_uuid(&chat_id)?;
    let sender_name = if body.sender_name.trim().is_empty() {
        body.sender_email
            .split('@')
            .next()
            .unwrap_or(&body.sender_email)
            .to_string()
    } else {
        body.sender_name
    };

    let outcome = state
        .chat_service
        .append_bridge_message(
            &id,
            AppendMessage {
                text: body.message,
                sender_email: body.sender_email.clone(),
                sender_name,
            },
        )
        .await?;

    tracing::info!(chat_id = %id, from = %body.sender_email, "email message appended");

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_bridge_key_is_stable_hex() {
        let a = hash_bridge_key("bridge-secret");
        let b = hash_bridge_key("bridge-secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash_bridge_key("other"), a);
    }
}
