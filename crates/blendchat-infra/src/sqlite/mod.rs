//! SQLite persistence: the database pool and the chat store.

pub mod chat;
pub mod pool;
