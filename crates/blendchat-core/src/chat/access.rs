//! Access verification for link-based chat authorization.
//!
//! A chat's token map holds one secret per participant email. A read
//! request must present a matching `(email, token)` pair. The check is
//! single-shot: no retry policy, no store writes.

use blendchat_types::chat::Chat;
use blendchat_types::error::ChatError;

/// Verify a caller-supplied credential pair against a chat's token map.
///
/// - No tokens configured: the chat is open, access is granted.
/// - Otherwise both `email` and `token` are required; a missing credential,
///   unknown email, or token mismatch all fail with `Unauthorized`.
///
/// `NotFound` is never produced here -- callers resolve chat existence
/// first, keeping the two failure cases distinguishable without leaking
/// anything further.
pub fn verify_access(
    chat: &Chat,
    email: Option<&str>,
    token: Option<&str>,
) -> Result<(), ChatError> {
    if chat.access_tokens.is_empty() {
        return Ok(());
    }

    let (Some(email), Some(token)) = (email, token) else {
        return Err(ChatError::Unauthorized);
    };

    match chat.access_tokens.get(email) {
        Some(expected) if expected == token => Ok(()),
        _ => Err(ChatError::Unauthorized),
    }
}
