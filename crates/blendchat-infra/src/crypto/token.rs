//! OS-RNG access-token generator.
//!
//! Implements the `TokenGenerator` port with 16 random bytes from the OS
//! RNG, hex-encoded to a 32-character URL-safe secret suitable for join
//! links.

use aes_gcm::aead::{rand_core::RngCore, OsRng};

use blendchat_core::token::TokenGenerator;

/// Token generator backed by the operating-system RNG.
#[derive(Default)]
pub struct OsRngTokenGenerator;

impl OsRngTokenGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TokenGenerator for OsRngTokenGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
