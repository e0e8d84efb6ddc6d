//! TokenGenerator trait for minting per-participant access tokens.
//!
//! Defined in blendchat-core so the chat service can mint secrets without
//! coupling to an RNG source. The `OsRngTokenGenerator` adapter lives in
//! blendchat-infra.

/// Abstraction over access-token generation.
pub trait TokenGenerator: Send + Sync {
    /// Mint a fresh, non-empty, URL-safe secret token.
    fn generate(&self) -> String;
}
