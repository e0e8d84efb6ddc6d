//! Shared domain types for BlendChat.
//!
//! This crate contains the core domain types used across the BlendChat
//! service: Chat, Message, LLM wire shapes, outbound email, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod email;
pub mod error;
pub mod llm;
