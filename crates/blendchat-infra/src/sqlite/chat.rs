//! SQLite chat store implementation.
//!
//! Implements `ChatStore` from `blendchat-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, rfc3339 datetime
//! columns. Messages are rows of their own, so an append is a plain INSERT
//! -- concurrent appends to the same chat both land, with no
//! read-modify-write of a message list anywhere.

use blendchat_core::chat::store::ChatStore;
use blendchat_types::chat::{ActionItem, Chat, ChatInsights, Message, Sender, Sentiment};
use blendchat_types::error::RepositoryError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatStore`.
pub struct SqliteChatStore {
    pool: DatabasePool,
}

impl SqliteChatStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: String,
    title: String,
    created_at: String,
    updated_at: String,
    creator_email: String,
    creator_name: String,
    include_assistant: i64,
    ai_summary: Option<String>,
    tags: Option<String>,
    expires_at: Option<String>,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            creator_email: row.try_get("creator_email")?,
            creator_name: row.try_get("creator_name")?,
            include_assistant: row.try_get("include_assistant")?,
            ai_summary: row.try_get("ai_summary")?,
            tags: row.try_get("tags")?,
            expires_at: row.try_get("expires_at")?,
        })
    }

    fn into_chat(
        self,
        invited_emails: Vec<String>,
        access_tokens: HashMap<String, String>,
        messages: Vec<Message>,
        action_items: Vec<ActionItem>,
    ) -> Result<Chat, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;
        let expires_at = self.expires_at.as_deref().map(parse_datetime).transpose()?;

        let tags: Vec<String> = match self.tags.as_deref() {
            Some(json) => serde_json::from_str(json)
                .map_err(|e| RepositoryError::Query(format!("invalid tags JSON: {e}")))?,
            None => Vec::new(),
        };

        let insights = if self.ai_summary.is_some() || !tags.is_empty() || !action_items.is_empty()
        {
            Some(ChatInsights {
                summary: self.ai_summary.unwrap_or_default(),
                action_items,
                tags,
            })
        } else {
            None
        };

        Ok(Chat {
            id,
            title: self.title,
            created_at,
            updated_at,
            creator_email: self.creator_email,
            creator_name: self.creator_name,
            invited_emails,
            access_tokens,
            include_assistant: self.include_assistant != 0,
            messages,
            insights,
            expires_at,
        })
    }
}

struct MessageRow {
    id: String,
    sender: String,
    sender_email: Option<String>,
    sender_name: Option<String>,
    sentiment: Option<String>,
    text: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            sender: row.try_get("sender")?,
            sender_email: row.try_get("sender_email")?,
            sender_name: row.try_get("sender_name")?,
            sentiment: row.try_get("sentiment")?,
            text: row.try_get("text")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;

        let sender = match self.sender.as_str() {
            "user" => {
                let sentiment: Option<Sentiment> = self
                    .sentiment
                    .as_deref()
                    .map(str::parse)
                    .transpose()
                    .map_err(|e: String| RepositoryError::Query(e))?;
                Sender::User {
                    email: self.sender_email.ok_or_else(|| {
                        RepositoryError::Query("user message missing sender_email".to_string())
                    })?,
                    name: self.sender_name.unwrap_or_default(),
                    sentiment,
                }
            }
            "assistant" => Sender::Assistant,
            "email" => Sender::Email {
                email: self.sender_email.ok_or_else(|| {
                    RepositoryError::Query("email message missing sender_email".to_string())
                })?,
                name: self.sender_name.unwrap_or_default(),
            },
            other => {
                return Err(RepositoryError::Query(format!(
                    "invalid sender kind: '{other}'"
                )))
            }
        };

        Ok(Message {
            id,
            text: self.text,
            created_at,
            sender,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn message_sender_columns(
    message: &Message,
) -> (Option<&str>, Option<&str>, Option<String>) {
    match &message.sender {
        Sender::User {
            email,
            name,
            sentiment,
        } => (
            Some(email.as_str()),
            Some(name.as_str()),
            sentiment.map(|s| s.to_string()),
        ),
        Sender::Assistant => (None, None, None),
        Sender::Email { email, name } => (Some(email.as_str()), Some(name.as_str()), None),
    }
}

async fn insert_message(
    executor: &mut sqlx::SqliteConnection,
    chat_id: &Uuid,
    message: &Message,
) -> Result<(), RepositoryError> {
    let (sender_email, sender_name, sentiment) = message_sender_columns(message);

    sqlx::query(
        r#"INSERT INTO chat_messages (id, chat_id, sender, sender_email, sender_name, sentiment, text, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(message.id.to_string())
    .bind(chat_id.to_string())
    .bind(message.sender.kind())
    .bind(sender_email)
    .bind(sender_name)
    .bind(sentiment)
    .bind(&message.text)
    .bind(format_datetime(&message.created_at))
    .execute(executor)
    .await
    .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// ChatStore implementation
// ---------------------------------------------------------------------------

impl ChatStore for SqliteChatStore {
    async fn create_chat(&self, chat: &Chat) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO chats (id, title, created_at, updated_at, creator_email, creator_name, include_assistant, ai_summary, tags, expires_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, NULL, NULL, ?)"#,
        )
        .bind(chat.id.to_string())
        .bind(&chat.title)
        .bind(format_datetime(&chat.created_at))
        .bind(format_datetime(&chat.updated_at))
        .bind(&chat.creator_email)
        .bind(&chat.creator_name)
        .bind(chat.include_assistant as i64)
        .bind(chat.expires_at.as_ref().map(format_datetime))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        for (email, token) in &chat.access_tokens {
            sqlx::query(
                r#"INSERT INTO chat_participants (chat_id, email, access_token, is_creator)
                   VALUES (?, ?, ?, ?)"#,
            )
            .bind(chat.id.to_string())
            .bind(email)
            .bind(token)
            .bind((email == &chat.creator_email) as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        for message in &chat.messages {
            insert_message(&mut *tx, &chat.id, message).await?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_chat(&self, chat_id: &Uuid) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(chat_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let chat_row =
            ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;

        let participant_rows = sqlx::query(
            "SELECT email, access_token, is_creator FROM chat_participants WHERE chat_id = ?",
        )
        .bind(chat_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut invited_emails = Vec::new();
        let mut access_tokens = HashMap::with_capacity(participant_rows.len());
        for row in &participant_rows {
            let email: String = row
                .try_get("email")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let token: String = row
                .try_get("access_token")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let is_creator: i64 = row
                .try_get("is_creator")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            if is_creator == 0 {
                invited_emails.push(email.clone());
            }
            access_tokens.insert(email, token);
        }
        invited_emails.sort();

        let message_rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE chat_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(message_rows.len());
        for row in &message_rows {
            let msg_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        let item_rows = sqlx::query(
            "SELECT text, completed, assigned_to FROM chat_action_items WHERE chat_id = ? ORDER BY position ASC",
        )
        .bind(chat_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut action_items = Vec::with_capacity(item_rows.len());
        for row in &item_rows {
            let completed: i64 = row
                .try_get("completed")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            action_items.push(ActionItem {
                text: row
                    .try_get("text")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
                completed: completed != 0,
                assigned_to: row
                    .try_get("assigned_to")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
            });
        }

        Ok(Some(chat_row.into_chat(
            invited_emails,
            access_tokens,
            messages,
            action_items,
        )?))
    }

    async fn append_message(
        &self,
        chat_id: &Uuid,
        message: &Message,
    ) -> Result<(), RepositoryError> {
        // The updated_at bump doubles as the existence check, so no orphan
        // message row is ever written.
        let result = sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(chat_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let mut conn = self
            .pool
            .writer
            .acquire()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        insert_message(&mut *conn, chat_id, message).await?;

        Ok(())
    }

    async fn update_insights(
        &self,
        chat_id: &Uuid,
        insights: &ChatInsights,
    ) -> Result<(), RepositoryError> {
        let tags_json = serde_json::to_string(&insights.tags)
            .map_err(|e| RepositoryError::Query(format!("tags serialization: {e}")))?;

        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE chats SET ai_summary = ?, tags = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&insights.summary)
        .bind(&tags_json)
        .bind(format_datetime(&Utc::now()))
        .bind(chat_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        // Action items are replaced wholesale by each analysis pass.
        sqlx::query("DELETE FROM chat_action_items WHERE chat_id = ?")
            .bind(chat_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        for (position, item) in insights.action_items.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO chat_action_items (id, chat_id, text, completed, assigned_to, position)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(Uuid::now_v7().to_string())
            .bind(chat_id.to_string())
            .bind(&item.text)
            .bind(item.completed as i64)
            .bind(&item.assigned_to)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn count_messages(&self, chat_id: &Uuid) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_messages WHERE chat_id = ?")
            .bind(chat_id.to_string())
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;
    use std::sync::Arc;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_chat() -> Chat {
        let now = Utc::now();
        let id = Uuid::now_v7();
        let mut access_tokens = HashMap::new();
        access_tokens.insert("a@x.com".to_string(), "tok-a".to_string());
        access_tokens.insert("b@x.com".to_string(), "tok-b".to_string());

        Chat {
            id,
            title: "hello".to_string(),
            created_at: now,
            updated_at: now,
            creator_email: "a@x.com".to_string(),
            creator_name: "Ada".to_string(),
            invited_emails: vec!["b@x.com".to_string()],
            access_tokens,
            include_assistant: true,
            messages: vec![Message {
                id: Uuid::now_v7(),
                text: "hello".to_string(),
                created_at: now,
                sender: Sender::User {
                    email: "a@x.com".to_string(),
                    name: "Ada".to_string(),
                    sentiment: Some(Sentiment::Neutral),
                },
            }],
            insights: None,
            expires_at: Some(now + chrono::Duration::days(30)),
        }
    }

    fn make_message(sender: Sender, text: &str) -> Message {
        Message {
            id: Uuid::now_v7(),
            text: text.to_string(),
            created_at: Utc::now(),
            sender,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_chat() {
        let store = SqliteChatStore::new(test_pool().await);
        let chat = make_chat();
        store.create_chat(&chat).await.unwrap();

        let found = store.get_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(found.id, chat.id);
        assert_eq!(found.title, "hello");
        assert_eq!(found.creator_email, "a@x.com");
        assert!(found.include_assistant);
        assert_eq!(found.invited_emails, vec!["b@x.com".to_string()]);
        assert_eq!(found.access_tokens.len(), 2);
        assert_eq!(found.access_tokens["b@x.com"], "tok-b");
        assert_eq!(found.messages.len(), 1);
        assert!(matches!(
            &found.messages[0].sender,
            Sender::User { sentiment: Some(Sentiment::Neutral), .. }
        ));
        assert!(found.insights.is_none());
        assert!(found.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_get_unknown_chat_is_none() {
        let store = SqliteChatStore::new(test_pool().await);
        assert!(store.get_chat(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_preserves_order_and_bumps_updated_at() {
        let store = SqliteChatStore::new(test_pool().await);
        let chat = make_chat();
        store.create_chat(&chat).await.unwrap();

        store
            .append_message(
                &chat.id,
                &make_message(
                    Sender::User {
                        email: "b@x.com".to_string(),
                        name: "Bea".to_string(),
                        sentiment: None,
                    },
                    "what's 2+2?",
                ),
            )
            .await
            .unwrap();
        store
            .append_message(&chat.id, &make_message(Sender::Assistant, "4"))
            .await
            .unwrap();

        let found = store.get_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(found.messages.len(), 3);
        assert_eq!(found.messages[1].text, "what's 2+2?");
        assert_eq!(found.messages[2].text, "4");
        assert_eq!(found.messages[2].sender, Sender::Assistant);
        assert!(found.updated_at > chat.updated_at);
    }

    #[tokio::test]
    async fn test_append_to_unknown_chat_is_not_found() {
        let store = SqliteChatStore::new(test_pool().await);
        let err = store
            .append_message(&Uuid::now_v7(), &make_message(Sender::Assistant, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_concurrent_appends_all_survive() {
        let store = Arc::new(SqliteChatStore::new(test_pool().await));
        let chat = make_chat();
        store.create_chat(&chat).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = Arc::clone(&store);
            let chat_id = chat.id;
            handles.push(tokio::spawn(async move {
                store
                    .append_message(
                        &chat_id,
                        &make_message(
                            Sender::User {
                                email: format!("u{i}@x.com"),
                                name: format!("U{i}"),
                                sentiment: None,
                            },
                            &format!("concurrent {i}"),
                        ),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Original message plus all 10 concurrent appends, none lost.
        assert_eq!(store.count_messages(&chat.id).await.unwrap(), 11);
        let found = store.get_chat(&chat.id).await.unwrap().unwrap();
        for i in 0..10 {
            assert!(found.messages.iter().any(|m| m.text == format!("concurrent {i}")));
        }
    }

    #[tokio::test]
    async fn test_update_insights_roundtrip() {
        let store = SqliteChatStore::new(test_pool().await);
        let chat = make_chat();
        store.create_chat(&chat).await.unwrap();

        let insights = ChatInsights {
            summary: "Planning a launch.".to_string(),
            action_items: vec![
                ActionItem {
                    text: "book the venue".to_string(),
                    completed: false,
                    assigned_to: Some("Bea".to_string()),
                },
                ActionItem {
                    text: "send invites".to_string(),
                    completed: true,
                    assigned_to: None,
                },
            ],
            tags: vec!["launch".to_string(), "logistics".to_string()],
        };
        store.update_insights(&chat.id, &insights).await.unwrap();

        let found = store.get_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(found.insights.as_ref().unwrap(), &insights);

        // A second pass replaces action items wholesale.
        let revised = ChatInsights {
            summary: "Venue booked.".to_string(),
            action_items: vec![ActionItem {
                text: "send invites".to_string(),
                completed: false,
                assigned_to: None,
            }],
            tags: vec!["launch".to_string()],
        };
        store.update_insights(&chat.id, &revised).await.unwrap();

        let found = store.get_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(found.insights.unwrap(), revised);
    }

    #[tokio::test]
    async fn test_update_insights_unknown_chat_is_not_found() {
        let store = SqliteChatStore::new(test_pool().await);
        let err = store
            .update_insights(&Uuid::now_v7(), &ChatInsights::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_bridge_message_roundtrip() {
        let store = SqliteChatStore::new(test_pool().await);
        let chat = make_chat();
        store.create_chat(&chat).await.unwrap();

        store
            .append_message(
                &chat.id,
                &make_message(
                    Sender::Email {
                        email: "b@x.com".to_string(),
                        name: "Bea".to_string(),
                    },
                    "replying by mail",
                ),
            )
            .await
            .unwrap();

        let found = store.get_chat(&chat.id).await.unwrap().unwrap();
        assert!(matches!(
            &found.messages[1].sender,
            Sender::Email { email, .. } if email == "b@x.com"
        ));
    }
}
