//! Mailer trait definition and invitation email composition.
//!
//! Every invitee gets their own email with a join link embedding their
//! personal `(chat_id, email, token)` triple. Sends are independent and
//! best-effort; composition lives here so it can be tested without a
//! delivery backend.

use blendchat_types::chat::Chat;
use blendchat_types::email::{EmailError, OutboundEmail};

/// Port for email-delivery backends.
pub trait Mailer: Send + Sync {
    /// Deliver one email to one recipient, best-effort.
    fn send(
        &self,
        email: &OutboundEmail,
    ) -> impl std::future::Future<Output = Result<(), EmailError>> + Send;
}

/// Truncate preview text to `max` characters, appending an ellipsis when
/// shortened.
fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

/// Compose the invitation email for one invitee.
///
/// The join link carries the invitee's own access token; no other
/// participant's token ever appears in the message.
pub fn invitation_email(site_url: &str, chat: &Chat, invitee: &str, token: &str) -> OutboundEmail {
    let first_message = chat
        .messages
        .first()
        .map(|m| preview(&m.text, 200))
        .unwrap_or_default();

    let join_url = format!(
        "{site_url}/chat/{id}?email={invitee}&token={token}",
        id = chat.id
    );

    let html = format!(
        "<h2>You've been invited to a group chat!</h2>\n\
         <p>{creator_name} ({creator_email}) invited you to join a conversation.</p>\n\
         <p><strong>First message:</strong> \"{first_message}\"</p>\n\
         <p><a href=\"{join_url}\">Join the conversation &rarr;</a></p>",
        creator_name = chat.creator_name,
        creator_email = chat.creator_email,
    );

    OutboundEmail {
        to: invitee.to_string(),
        subject: format!("{} invited you to a group chat", chat.creator_name),
        html,
    }
}
