//! In-process session registry.
//!
//! Tokens are opaque, URL-safe, and carry 256 bits of entropy. The registry
//! is an owned object injected into the service, not ambient global state;
//! every access goes through one mutex. Sessions expire after a configurable
//! TTL, checked on resolve and reclaimable in bulk with [`SessionRegistry::sweep`].

use crate::auth;
use crate::db::now_ms;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    expires_at: i64,
}

/// Token -> user mapping with TTL.
pub struct SessionRegistry {
    inner: Mutex<HashMap<String, Session>>,
    ttl_ms: i64,
}

impl SessionRegistry {
    /// Create a registry whose sessions live for `ttl_seconds`.
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl_ms: ttl_seconds.saturating_mul(1000),
        }
    }

    /// Issue a fresh token bound to `user_id`.
    pub fn create(&self, user_id: &str) -> String {
        let token = auth::generate_session_token();
        let session = Session {
            user_id: user_id.to_string(),
            expires_at: now_ms() + self.ttl_ms,
        };
        self.inner
            .lock()
            .expect("session mutex poisoned")
            .insert(token.clone(), session);
        token
    }

    /// Resolve a token to its user id. Expired entries are dropped on touch
    /// and reported absent, same as a token that never existed.
    pub fn resolve(&self, token: &str) -> Option<String> {
        let mut map = self.inner.lock().expect("session mutex poisoned");
        match map.get(token) {
            Some(session) if session.expires_at > now_ms() => Some(session.user_id.clone()),
            Some(_) => {
                map.remove(token);
                None
            }
            None => None,
        }
    }

    /// Remove a token. Idempotent.
    pub fn destroy(&self, token: &str) {
        self.inner
            .lock()
            .expect("session mutex poisoned")
            .remove(token);
    }

    /// Drop every expired session, returning how many were removed.
    /// Callers decide when to run this; the registry schedules nothing.
    pub fn sweep(&self) -> usize {
        let now = now_ms();
        let mut map = self.inner.lock().expect("session mutex poisoned");
        let before = map.len();
        map.retain(|_, session| session.expires_at > now);
        before - map.len()
    }

    /// Number of live entries, expired or not. Diagnostic only.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("session mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    #[test]
    fn create_then_resolve_round_trips() {
        let registry = SessionRegistry::new(DAY);
        let token = registry.create("user-1");
        assert_eq!(registry.resolve(&token).as_deref(), Some("user-1"));
    }

    #[test]
    fn destroy_is_idempotent() {
        let registry = SessionRegistry::new(DAY);
        let token = registry.create("user-1");
        registry.destroy(&token);
        assert_eq!(registry.resolve(&token), None);
        registry.destroy(&token); // second call is a no-op
        assert_eq!(registry.resolve(&token), None);
    }

    #[test]
    fn unknown_token_resolves_to_none() {
        let registry = SessionRegistry::new(DAY);
        assert_eq!(registry.resolve("no-such-token"), None);
    }

    #[test]
    fn expired_session_is_absent_and_dropped() {
        let registry = SessionRegistry::new(0);
        let token = registry.create("user-1");
        assert_eq!(registry.resolve(&token), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let short = SessionRegistry::new(0);
        short.create("stale");
        short.create("stale");
        assert_eq!(short.sweep(), 2);
        assert!(short.is_empty());

        let long = SessionRegistry::new(DAY);
        long.create("fresh");
        assert_eq!(long.sweep(), 0);
        assert_eq!(long.len(), 1);
    }

    #[test]
    fn tokens_are_unique_per_session() {
        let registry = SessionRegistry::new(DAY);
        let a = registry.create("user-1");
        let b = registry.create("user-1");
        assert_ne!(a, b);
        registry.destroy(&a);
        assert_eq!(registry.resolve(&b).as_deref(), Some("user-1"));
    }
}
