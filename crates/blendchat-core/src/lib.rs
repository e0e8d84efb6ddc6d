//! Business logic and port trait definitions for BlendChat.
//!
//! This crate defines the "ports" (store, completion provider, mailer,
//! token generator traits) that the infrastructure layer implements. It
//! depends only on `blendchat-types` -- never on `blendchat-infra` or any
//! database/IO crate.

pub mod chat;
pub mod email;
pub mod llm;
pub mod token;
