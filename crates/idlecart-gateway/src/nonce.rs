//! Authenticity tokens
//!
//! Session- and action-scoped tokens, minted into the page at render time
//! and verified before any privileged cart operation. A token stays valid
//! for its session, so duplicate clear requests from racing tabs all
//! verify; the idempotent empty makes that harmless.

use sha2::{Digest, Sha256};
use uuid::Uuid;

pub struct NonceIssuer {
    secret: [u8; 16],
}

impl NonceIssuer {
    pub fn new() -> Self {
        Self {
            secret: Uuid::new_v4().into_bytes(),
        }
    }

    /// Mint a token bound to a session and action.
    pub fn issue(&self, session_id: &str, action: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        hasher.update(session_id.as_bytes());
        hasher.update(b"\x00");
        hasher.update(action.as_bytes());
        let digest = hasher.finalize();

        let mut token = String::with_capacity(digest.len() * 2);
        for b in digest {
            use std::fmt::Write;
            let _ = write!(token, "{:02x}", b);
        }
        token
    }

    /// Check a presented token against a fresh derivation.
    pub fn verify(&self, session_id: &str, action: &str, token: &str) -> bool {
        self.issue(session_id, action) == token
    }
}

impl Default for NonceIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for NonceIssuer {
    fn clone(&self) -> Self {
        Self {
            secret: self.secret,
        }
    }
}
