// 🔐 Shared-Password Authentication
//
// One admin password for the whole household; a successful login gets a
// random session token that lives until logout or restart.

use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "estate_session";

/// Plain equality against the configured password
pub fn verify_password(candidate: &str, expected: &str) -> bool {
    !expected.is_empty() && candidate == expected
}

/// In-memory set of live session tokens
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: Mutex<HashSet<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token
    pub fn create(&self) -> String {
        let token = Uuid::new_v4().to_string();
        match self.tokens.lock() {
            Ok(mut tokens) => {
                tokens.insert(token.clone());
            }
            Err(poisoned) => {
                warn!("session store lock poisoned, recovering");
                poisoned.into_inner().insert(token.clone());
            }
        }
        debug!("session created");
        token
    }

    pub fn is_valid(&self, token: &str) -> bool {
        match self.tokens.lock() {
            Ok(tokens) => tokens.contains(token),
            Err(poisoned) => poisoned.into_inner().contains(token),
        }
    }

    /// Forget a token; returns whether it was live
    pub fn revoke(&self, token: &str) -> bool {
        match self.tokens.lock() {
            Ok(mut tokens) => tokens.remove(token),
            Err(poisoned) => poisoned.into_inner().remove(token),
        }
    }

    pub fn len(&self) -> usize {
        match self.tokens.lock() {
            Ok(tokens) => tokens.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password() {
        assert!(verify_password("hunter2", "hunter2"));
        assert!(!verify_password("Hunter2", "hunter2"));
        assert!(!verify_password("", "hunter2"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_session_lifecycle() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);
        assert!(store.is_valid(&a));
        assert_eq!(store.len(), 2);

        assert!(store.revoke(&a));
        assert!(!store.is_valid(&a));
        assert!(!store.revoke(&a));
        assert!(store.is_valid(&b));
        assert!(!store.is_valid("forged-token"));
    }
}
