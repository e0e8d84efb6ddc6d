//! Environment-driven application configuration.
//!
//! Read once at startup and held in `AppState`. Missing AI or email
//! credentials disable the corresponding capability with a startup warning
//! instead of failing requests at runtime.

use std::path::PathBuf;

use secrecy::SecretString;
use tracing::warn;

/// Runtime configuration for the BlendChat server.
#[derive(Clone)]
pub struct AppConfig {
    /// Directory holding the SQLite database.
    pub data_dir: PathBuf,
    /// OpenAI API key; absent disables assistant turns.
    pub openai_api_key: Option<SecretString>,
    pub openai_model: String,
    /// Override of the completion endpoint base URL.
    pub openai_base_url: Option<String>,
    /// Resend API key; absent disables invitation delivery.
    pub resend_api_key: Option<SecretString>,
    /// Override of the email delivery base URL.
    pub resend_base_url: Option<String>,
    /// From header for outbound mail.
    pub email_from: String,
    /// Base URL embedded in invitation join links.
    pub site_url: String,
    /// Shared secret for the inbound-email bridge; absent disables the
    /// bridge endpoint.
    pub bridge_secret: Option<SecretString>,
    pub ai_context_window: usize,
    pub insights_threshold: u64,
    pub chat_ttl_days: i64,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env_opt(name).map(|v| v.parse()) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            warn!(var = name, "unparseable value, using default");
            default
        }
        None => default,
    }
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        let data_dir = env_opt("BLENDCHAT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".blendchat")
            });

        let openai_api_key = env_opt("OPENAI_API_KEY").map(SecretString::from);
        if openai_api_key.is_none() {
            warn!("OPENAI_API_KEY not set; assistant replies will use the fallback message");
        }

        let resend_api_key = env_opt("RESEND_API_KEY").map(SecretString::from);
        if resend_api_key.is_none() {
            warn!("RESEND_API_KEY not set; invitation emails will not be delivered");
        }

        let bridge_secret = env_opt("BLENDCHAT_BRIDGE_SECRET").map(SecretString::from);
        if bridge_secret.is_none() {
            warn!("BLENDCHAT_BRIDGE_SECRET not set; the inbound-email bridge endpoint is disabled");
        }

        Self {
            data_dir,
            openai_api_key,
            openai_model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            resend_api_key,
            resend_base_url: env_opt("RESEND_BASE_URL"),
            email_from: env_or(
                "BLENDCHAT_EMAIL_FROM",
                "BlendChat <noreply@blendchat.example>",
            ),
            site_url: env_or("BLENDCHAT_SITE_URL", "https://blendchat.example"),
            bridge_secret,
            ai_context_window: env_parsed("BLENDCHAT_AI_CONTEXT_WINDOW", 10),
            insights_threshold: env_parsed("BLENDCHAT_INSIGHTS_THRESHOLD", 5),
            chat_ttl_days: env_parsed("BLENDCHAT_CHAT_TTL_DAYS", 30),
        }
    }
}
