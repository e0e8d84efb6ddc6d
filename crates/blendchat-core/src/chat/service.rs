//! Chat service orchestrating creation, access-checked reads, message
//! appends, and the optional AI turn.
//!
//! Generic over the store/provider/mailer/token ports to maintain clean
//! architecture (blendchat-core never depends on blendchat-infra). All
//! durable state lives behind `ChatStore`; the service itself holds no
//! shared mutable state, so requests may run concurrently.

use std::collections::HashMap;

use blendchat_types::chat::{Chat, Message, Sender};
use blendchat_types::error::ChatError;
use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::{access, sentiment, store::ChatStore};
use crate::email::mailer::{invitation_email, Mailer};
use crate::llm::prompt;
use crate::llm::provider::CompletionProvider;
use crate::token::TokenGenerator;

/// Chat titles are the first message truncated to this many characters.
const TITLE_MAX_CHARS: usize = 50;

/// Tunables for the chat service.
#[derive(Debug, Clone)]
pub struct ChatServiceConfig {
    /// Model identifier passed to the completion provider.
    pub model: String,
    /// Base URL embedded in invitation join links.
    pub site_url: String,
    /// How many prior messages feed the assistant reply context.
    pub ai_context_window: usize,
    /// Message count at which the insights analysis starts running.
    pub insights_threshold: u64,
    /// Storage TTL applied to new chats.
    pub chat_ttl_days: i64,
}

impl Default for ChatServiceConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            site_url: "https://blendchat.example".to_string(),
            ai_context_window: 10,
            insights_threshold: 5,
            chat_ttl_days: 30,
        }
    }
}

/// Request payload for chat creation.
#[derive(Debug, Clone)]
pub struct NewChat {
    pub creator_email: String,
    pub creator_name: String,
    pub invited_emails: Vec<String>,
    pub message: String,
    pub include_assistant: bool,
}

/// Request payload for a message append.
#[derive(Debug, Clone)]
pub struct AppendMessage {
    pub text: String,
    pub sender_email: String,
    pub sender_name: String,
}

/// Result of a message append: the stored message, the assistant reply
/// when one was produced, and whether the insights analysis is due.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub message: Message,
    pub assistant_message: Option<Message>,
    pub insights_due: bool,
}

/// Orchestrates the chat lifecycle: create, fetch with access check,
/// append with optional AI turn, insights refresh.
pub struct ChatService<S, P, M, G>
where
    S: ChatStore,
    P: CompletionProvider,
    M: Mailer,
    G: TokenGenerator,
{
    store: S,
    provider: P,
    mailer: M,
    tokens: G,
    config: ChatServiceConfig,
}

impl<S, P, M, G> ChatService<S, P, M, G>
where
    S: ChatStore,
    P: CompletionProvider,
    M: Mailer,
    G: TokenGenerator,
{
    pub fn new(store: S, provider: P, mailer: M, tokens: G, config: ChatServiceConfig) -> Self {
        Self {
            store,
            provider,
            mailer,
            tokens,
            config,
        }
    }

    /// Access the chat store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Creation ---

    /// Create a chat: generated id, per-participant access tokens (creator
    /// included), title derived from the first message, and the initial
    /// creator message, persisted atomically.
    ///
    /// Invitations are sent afterwards, one per invitee, each best-effort:
    /// delivery failures are logged per-recipient and never abort creation.
    pub async fn create_chat(&self, req: NewChat) -> Result<Chat, ChatError> {
        let message = req.message.trim();
        if message.is_empty() {
            return Err(ChatError::Validation("message is required".to_string()));
        }
        if req.creator_email.trim().is_empty() {
            return Err(ChatError::Validation(
                "creator_email is required".to_string(),
            ));
        }

        let now = Utc::now();
        let chat_id = Uuid::now_v7();

        // Deduplicate invitees; the creator is a participant, not an invitee.
        let mut invited_emails: Vec<String> = Vec::new();
        for email in &req.invited_emails {
            let email = email.trim();
            if email.is_empty() || email == req.creator_email || invited_emails.iter().any(|e| e == email) {
                continue;
            }
            invited_emails.push(email.to_string());
        }

        let mut access_tokens = HashMap::with_capacity(invited_emails.len() + 1);
        access_tokens.insert(req.creator_email.clone(), self.tokens.generate());
        for email in &invited_emails {
            access_tokens.insert(email.clone(), self.tokens.generate());
        }

        let initial_message = Message {
            id: Uuid::now_v7(),
            text: message.to_string(),
            created_at: now,
            sender: Sender::User {
                email: req.creator_email.clone(),
                name: req.creator_name.clone(),
                sentiment: Some(sentiment::analyze(message)),
            },
        };

        let chat = Chat {
            id: chat_id,
            title: derive_title(message),
            created_at: now,
            updated_at: now,
            creator_email: req.creator_email,
            creator_name: req.creator_name,
            invited_emails,
            access_tokens,
            include_assistant: req.include_assistant,
            messages: vec![initial_message],
            insights: None,
            expires_at: Some(now + Duration::days(self.config.chat_ttl_days)),
        };

        self.store.create_chat(&chat).await?;
        info!(chat_id = %chat.id, invitees = chat.invited_emails.len(), "chat created");

        self.send_invitations(&chat).await;

        Ok(chat)
    }

    /// Send one invitation per invitee, each carrying that invitee's own
    /// join link. Failures are logged and swallowed.
    async fn send_invitations(&self, chat: &Chat) {
        for invitee in &chat.invited_emails {
            let Some(token) = chat.access_tokens.get(invitee) else {
                continue;
            };
            let email = invitation_email(&self.config.site_url, chat, invitee, token);
            match self.mailer.send(&email).await {
                Ok(()) => info!(chat_id = %chat.id, to = %invitee, "invitation sent"),
                Err(e) => {
                    warn!(chat_id = %chat.id, to = %invitee, error = %e, "invitation delivery failed");
                }
            }
        }
    }

    // --- Reads ---

    /// Fetch a chat, enforcing the access-token check.
    ///
    /// Unknown or expired ids fail with `NotFound`; a bad or missing
    /// credential pair fails with `Unauthorized`. The two cases are never
    /// conflated.
    pub async fn fetch_chat(
        &self,
        chat_id: &Uuid,
        email: Option<&str>,
        token: Option<&str>,
    ) -> Result<Chat, ChatError> {
        let chat = self.load_live_chat(chat_id).await?;
        access::verify_access(&chat, email, token)?;
        Ok(chat)
    }

    async fn load_live_chat(&self, chat_id: &Uuid) -> Result<Chat, ChatError> {
        let chat = self
            .store
            .get_chat(chat_id)
            .await?
            .ok_or(ChatError::NotFound)?;
        if chat.is_expired(Utc::now()) {
            return Err(ChatError::NotFound);
        }
        Ok(chat)
    }

    // --- Appends ---

    /// Append a user message, then run the AI turn when the chat has its
    /// assistant enabled.
    pub async fn append_user_message(
        &self,
        chat_id: &Uuid,
        req: AppendMessage,
    ) -> Result<AppendOutcome, ChatError> {
        validate_append(&req)?;
        let sender = Sender::User {
            email: req.sender_email,
            name: req.sender_name,
            sentiment: Some(sentiment::analyze(&req.text)),
        };
        self.append_inbound(chat_id, req.text, sender).await
    }

    /// Append a message arriving through the inbound-email bridge. The
    /// caller authenticates the bridge before invoking this.
    pub async fn append_bridge_message(
        &self,
        chat_id: &Uuid,
        req: AppendMessage,
    ) -> Result<AppendOutcome, ChatError> {
        validate_append(&req)?;
        let sender = Sender::Email {
            email: req.sender_email,
            name: req.sender_name,
        };
        self.append_inbound(chat_id, req.text, sender).await
    }

    async fn append_inbound(
        &self,
        chat_id: &Uuid,
        text: String,
        sender: Sender,
    ) -> Result<AppendOutcome, ChatError> {
        let chat = self.load_live_chat(chat_id).await?;

        let message = Message {
            id: Uuid::now_v7(),
            text,
            created_at: Utc::now(),
            sender,
        };
        self.store.append_message(chat_id, &message).await?;

        // The user's message is durable from here on; an assistant failure
        // downgrades to a placeholder reply and never unwinds the append.
        let assistant_message = if chat.include_assistant {
            Some(self.assistant_turn(&chat, &message).await?)
        } else {
            None
        };

        let insights_due = chat.include_assistant
            && self.store.count_messages(chat_id).await? >= self.config.insights_threshold;

        Ok(AppendOutcome {
            message,
            assistant_message,
            insights_due,
        })
    }

    /// Produce and append one assistant reply. `chat.messages` still holds
    /// the pre-append history, which is exactly the reply context.
    async fn assistant_turn(&self, chat: &Chat, new_message: &Message) -> Result<Message, ChatError> {
        let request = prompt::reply_request(
            &self.config.model,
            &chat.messages,
            &new_message.text,
            self.config.ai_context_window,
        );

        let text = match self.provider.complete(&request).await {
            Ok(resp) if !resp.content.trim().is_empty() => resp.content,
            Ok(_) => {
                warn!(chat_id = %chat.id, "assistant returned empty reply, using fallback");
                prompt::FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                warn!(chat_id = %chat.id, provider = self.provider.name(), error = %e, "assistant reply failed, using fallback");
                prompt::FALLBACK_REPLY.to_string()
            }
        };

        let message = Message {
            id: Uuid::now_v7(),
            text,
            created_at: Utc::now(),
            sender: Sender::Assistant,
        };
        self.store.append_message(&chat.id, &message).await?;
        Ok(message)
    }

    // --- Insights ---

    /// Run the conversation analysis and persist the resulting insights.
    ///
    /// Best-effort by contract: provider failures and unparseable output
    /// are logged and reported as `Ok(false)`; only store failures
    /// propagate. Callers fire this as a detached task after an append
    /// crosses the threshold.
    pub async fn refresh_insights(&self, chat_id: &Uuid) -> Result<bool, ChatError> {
        let chat = self.load_live_chat(chat_id).await?;

        let request = prompt::analysis_request(&self.config.model, &chat.messages);
        let response = match self.provider.complete(&request).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "conversation analysis failed");
                return Ok(false);
            }
        };

        let insights = match prompt::parse_insights(&response.content) {
            Ok(insights) => insights,
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "conversation analysis returned unusable output");
                return Ok(false);
            }
        };

        self.store.update_insights(chat_id, &insights).await?;
        info!(chat_id = %chat_id, "conversation insights refreshed");
        Ok(true)
    }
}

fn validate_append(req: &AppendMessage) -> Result<(), ChatError> {
    if req.text.trim().is_empty() {
        return Err(ChatError::Validation("message is required".to_string()));
    }
    if req.sender_email.trim().is_empty() {
        return Err(ChatError::Validation(
            "sender_email is required".to_string(),
        ));
    }
    Ok(())
}

/// Chat titles are the first message, truncated.
fn derive_title(message: &str) -> String {
    if message.chars().count() <= TITLE_MAX_CHARS {
        message.to_string()
    } else {
        let head: String = message.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}...")
    }
}
