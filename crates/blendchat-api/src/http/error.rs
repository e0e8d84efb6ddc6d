//! Application error type mapping to HTTP status codes and envelope format.
//!
//! `CHAT_NOT_FOUND` and `UNAUTHORIZED` stay distinct so a failed access
//! check never reveals more than "the id is unknown" versus "the
//! credential is wrong".

use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use blendchat_types::error::ChatError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat domain errors.
    Chat(ChatError),
    /// Authentication failure (bridge shared secret).
    Unauthorized(String),
    /// Request validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::Chat(ChatError::NotFound) => {
                ("CHAT_NOT_FOUND", "Chat not found or expired".to_string())
            }
            AppError::Chat(ChatError::Unauthorized) => ("UNAUTHORIZED", "Unauthorized".to_string()),
            AppError::Chat(ChatError::Validation(msg)) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Chat(ChatError::Storage(msg)) => ("STORAGE_ERROR", msg.clone()),
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone()),
        };

        ApiResponse::error(code, &message, Uuid::now_v7().to_string(), 0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_and_unauthorized_stay_distinct() {
        let not_found = AppError::Chat(ChatError::NotFound).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let unauthorized = AppError::Chat(ChatError::Unauthorized).into_response();
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let resp = AppError::Validation("message is required".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
