//! Application state wiring all services together.
//!
//! The chat service is generic over its store/provider/mailer/token ports;
//! AppState pins it to the concrete infra implementations.

use std::sync::Arc;

use blendchat_core::chat::service::{ChatService, ChatServiceConfig};
use blendchat_infra::crypto::token::OsRngTokenGenerator;
use blendchat_infra::email::resend::ResendMailer;
use blendchat_infra::llm::openai::OpenAiProvider;
use blendchat_infra::sqlite::chat::SqliteChatStore;
use blendchat_infra::sqlite::pool::DatabasePool;

use crate::config::AppConfig;

/// Concrete type alias for the service generics pinned to infra
/// implementations.
pub type ConcreteChatService =
    ChatService<SqliteChatStore, OpenAiProvider, ResendMailer, OsRngTokenGenerator>;

/// Shared application state held by the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Initialize the application state: connect to the database, wire the
    /// chat service onto the concrete adapters.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            config.data_dir.join("blendchat.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;
        let store = SqliteChatStore::new(db_pool);

        let mut provider = OpenAiProvider::new(config.openai_api_key.clone());
        if let Some(base_url) = &config.openai_base_url {
            provider = provider.with_base_url(base_url.clone());
        }

        let mut mailer = ResendMailer::new(config.resend_api_key.clone(), config.email_from.clone());
        if let Some(base_url) = &config.resend_base_url {
            mailer = mailer.with_base_url(base_url.clone());
        }

        let service_config = ChatServiceConfig {
            model: config.openai_model.clone(),
            site_url: config.site_url.clone(),
            ai_context_window: config.ai_context_window,
            insights_threshold: config.insights_threshold,
            chat_ttl_days: config.chat_ttl_days,
        };

        let chat_service = ChatService::new(
            store,
            provider,
            mailer,
            OsRngTokenGenerator::new(),
            service_config,
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
        })
    }
}
