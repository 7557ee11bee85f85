//! Ephemeral single-use secrets for the password reset flow
//!
//! The store holds short-lived values keyed by a normalized owner email and a
//! secret kind: 4-digit reset codes sent by mail, and 32-character session
//! tokens handed out after a correct code. State lives in-process and is
//! shared through the axum application state; nothing survives a restart,
//! which is fine because every secret expires within minutes anyway.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Reset codes stay redeemable for 2 minutes.
pub const RESET_CODE_TTL: Duration = Duration::from_secs(120);
/// Session tokens stay redeemable for 10 minutes.
pub const SESSION_TOKEN_TTL: Duration = Duration::from_secs(600);

/// The two kinds of secrets the store manages, with independent TTLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretKind {
    /// 4-digit numeric code mailed to the user
    ResetCode,
    /// 32-character alphanumeric token returned after code redemption
    SessionToken,
}

#[derive(Debug)]
struct Entry {
    value: String,
    issued_at: Instant,
}

/// Expiring single-use secret store
///
/// Consumption contract: `try_consume` removes an entry only on a successful
/// match or when the entry turns out to be expired. A wrong candidate against
/// a live entry leaves it intact, so the user can retry until the TTL runs
/// out.
#[derive(Clone)]
pub struct CodeStore {
    reset_code_ttl: Duration,
    session_token_ttl: Duration,
    entries: Arc<Mutex<HashMap<(String, SecretKind), Entry>>>,
}

impl CodeStore {
    /// Create a store with the production TTLs
    pub fn new() -> Self {
        Self::with_ttls(RESET_CODE_TTL, SESSION_TOKEN_TTL)
    }

    /// Create a store with custom TTLs (used by tests)
    pub fn with_ttls(reset_code_ttl: Duration, session_token_ttl: Duration) -> Self {
        Self {
            reset_code_ttl,
            session_token_ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn ttl(&self, kind: SecretKind) -> Duration {
        match kind {
            SecretKind::ResetCode => self.reset_code_ttl,
            SecretKind::SessionToken => self.session_token_ttl,
        }
    }

    fn mint(kind: SecretKind) -> String {
        let mut rng = rand::thread_rng();
        match kind {
            SecretKind::ResetCode => format!("{:04}", rng.gen_range(0..10_000)),
            SecretKind::SessionToken => (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect(),
        }
    }

    /// Return the live secret for `(owner, kind)`, minting one if none exists
    ///
    /// Calling this twice within the TTL returns the identical value, so a
    /// repeated "send me a code" request re-sends the same code instead of
    /// invalidating the first mail.
    pub async fn get_or_create(&self, owner: &str, kind: SecretKind) -> String {
        let mut entries = self.entries.lock().await;
        let key = (owner.to_string(), kind);

        if let Some(entry) = entries.get(&key) {
            if entry.issued_at.elapsed() <= self.ttl(kind) {
                return entry.value.clone();
            }
        }

        let value = Self::mint(kind);
        entries.insert(
            key,
            Entry {
                value: value.clone(),
                issued_at: Instant::now(),
            },
        );
        value
    }

    /// Attempt to redeem a secret; true exactly once per issued value
    ///
    /// Returns false when no entry exists, when the entry has expired (the
    /// stale entry is evicted as a side effect), or when the candidate does
    /// not match. The lock spans the whole check-match-delete sequence, so
    /// two concurrent calls with the same valid candidate cannot both
    /// succeed.
    pub async fn try_consume(&self, owner: &str, kind: SecretKind, candidate: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let key = (owner.to_string(), kind);

        match entries.get(&key) {
            None => false,
            Some(entry) if entry.issued_at.elapsed() > self.ttl(kind) => {
                entries.remove(&key);
                false
            }
            Some(entry) if entry.value == candidate => {
                entries.remove(&key);
                true
            }
            Some(_) => false,
        }
    }
}

impl Default for CodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent_within_ttl() {
        let store = CodeStore::new();
        let first = store.get_or_create("alice@example.com", SecretKind::ResetCode).await;
        let second = store.get_or_create("alice@example.com", SecretKind::ResetCode).await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert!(first.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn kinds_are_independent() {
        let store = CodeStore::new();
        let code = store.get_or_create("bob@example.com", SecretKind::ResetCode).await;
        let token = store.get_or_create("bob@example.com", SecretKind::SessionToken).await;
        assert_ne!(code, token);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn expired_entries_are_replaced() {
        let store = CodeStore::with_ttls(Duration::from_millis(10), Duration::from_millis(10));
        let first = store.get_or_create("carol@example.com", SecretKind::SessionToken).await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        let second = store.get_or_create("carol@example.com", SecretKind::SessionToken).await;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn consume_succeeds_exactly_once() {
        let store = CodeStore::new();
        let code = store.get_or_create("dave@example.com", SecretKind::ResetCode).await;
        assert!(store.try_consume("dave@example.com", SecretKind::ResetCode, &code).await);
        assert!(!store.try_consume("dave@example.com", SecretKind::ResetCode, &code).await);
    }

    #[tokio::test]
    async fn wrong_candidate_leaves_entry_intact() {
        let store = CodeStore::new();
        let code = store.get_or_create("erin@example.com", SecretKind::ResetCode).await;
        let wrong = if code == "0000" { "1111" } else { "0000" };
        assert!(!store.try_consume("erin@example.com", SecretKind::ResetCode, wrong).await);
        // the live entry survived the failed attempt
        assert!(store.try_consume("erin@example.com", SecretKind::ResetCode, &code).await);
    }

    #[tokio::test]
    async fn consume_fails_for_unknown_owner() {
        let store = CodeStore::new();
        assert!(!store.try_consume("nobody@example.com", SecretKind::ResetCode, "1234").await);
    }

    #[tokio::test]
    async fn consume_fails_after_expiry() {
        let store = CodeStore::with_ttls(Duration::from_millis(10), Duration::from_millis(10));
        let code = store.get_or_create("frank@example.com", SecretKind::ResetCode).await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(!store.try_consume("frank@example.com", SecretKind::ResetCode, &code).await);
    }

    #[tokio::test]
    async fn concurrent_consumers_cannot_both_succeed() {
        let store = CodeStore::new();
        let token = store.get_or_create("grace@example.com", SecretKind::SessionToken).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                store.try_consume("grace@example.com", SecretKind::SessionToken, &token).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }
}
