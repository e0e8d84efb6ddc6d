//! Cryptographic adapters: access-token generation.

pub mod token;
