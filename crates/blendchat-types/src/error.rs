use thiserror::Error;

/// Errors surfaced by chat operations.
///
/// `NotFound` and `Unauthorized` are distinct, user-visible failures and
/// are never conflated; `Validation` is raised before the store is
/// touched. Upstream AI/email failures never appear here -- they are
/// downgraded to logged best-effort fallbacks at the call site.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from repository operations (used by trait definitions in
/// blendchat-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound,
            other => ChatError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::NotFound.to_string(), "chat not found");
        assert_eq!(ChatError::Unauthorized.to_string(), "unauthorized");
        let err = ChatError::Validation("message is required".to_string());
        assert_eq!(err.to_string(), "validation error: message is required");
    }

    #[test]
    fn test_repository_error_maps_to_chat_error() {
        assert!(matches!(
            ChatError::from(RepositoryError::NotFound),
            ChatError::NotFound
        ));
        assert!(matches!(
            ChatError::from(RepositoryError::Query("syntax error".to_string())),
            ChatError::Storage(_)
        ));
    }
}
