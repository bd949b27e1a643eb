//! Return-path preservation across a login redirect.
//!
//! When the guard sends an unauthenticated user to the login page, the
//! view they actually wanted is stashed here under a random token. After a
//! successful sign-in the token is redeemed once and the user lands where
//! they were headed, not on the front page.
//!
//! # Concurrency note
//!
//! `ReturnPathStore` is NOT thread-safe by itself — it uses a plain
//! `HashMap`. It is owned by the app shell and accessed under its lock;
//! keeping it simple here avoids hidden locking overhead.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for stashed return paths.
#[derive(Debug, Clone)]
pub struct ReturnPathConfig {
    /// How long (in seconds) a stashed path stays redeemable. A user who
    /// wanders off mid-login for longer than this lands on the default
    /// landing page instead.
    ///
    /// Default: 600 seconds (10 minutes).
    pub ttl_secs: u64,
}

impl Default for ReturnPathConfig {
    fn default() -> Self {
        Self { ttl_secs: 600 }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// One stashed destination.
#[derive(Debug)]
struct Pending {
    path: String,
    stashed_at: Instant,
}

/// Holds destinations across the login round trip.
///
/// ## Lifecycle
///
/// ```text
/// stash() ──→ take() (single use)
///    │
///    ▼ (after ttl)
/// purge_expired()
/// ```
pub struct ReturnPathStore {
    /// Stashed paths keyed by their redemption token.
    pending: HashMap<String, Pending>,
    config: ReturnPathConfig,
}

impl ReturnPathStore {
    /// Creates an empty store with the given config.
    pub fn new(config: ReturnPathConfig) -> Self {
        Self {
            pending: HashMap::new(),
            config,
        }
    }

    /// Stashes a destination and returns the redemption token.
    ///
    /// The token is what travels through the login flow (a query parameter
    /// or navigation state), not the path itself — so the destination can't
    /// be tampered with along the way.
    pub fn stash(&mut self, path: impl Into<String>) -> String {
        let token = generate_token();
        let path = path.into();

        tracing::debug!(%path, "return path stashed");
        self.pending.insert(
            token.clone(),
            Pending {
                path,
                stashed_at: Instant::now(),
            },
        );
        token
    }

    /// Redeems a token, returning the stashed path.
    ///
    /// Single use: the entry is removed whether or not it was still within
    /// its TTL. Returns `None` for unknown tokens and expired entries —
    /// callers fall back to the default landing page either way.
    pub fn take(&mut self, token: &str) -> Option<String> {
        let pending = self.pending.remove(token)?;

        let ttl = Duration::from_secs(self.config.ttl_secs);
        if pending.stashed_at.elapsed() > ttl {
            tracing::debug!(path = %pending.path, "return path expired");
            return None;
        }

        tracing::debug!(path = %pending.path, "return path redeemed");
        Some(pending.path)
    }

    /// Drops every entry past its TTL, freeing memory.
    ///
    /// Call this opportunistically (e.g., whenever a new path is stashed by
    /// the app shell) — abandoned logins would otherwise accumulate
    /// forever. Returns how many entries were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let ttl = Duration::from_secs(self.config.ttl_secs);
        let before = self.pending.len();
        self.pending
            .retain(|_, pending| pending.stashed_at.elapsed() <= ttl);

        let dropped = before - self.pending.len();
        if dropped > 0 {
            tracing::debug!(dropped, "purged expired return paths");
        }
        dropped
    }

    /// Number of stashed paths (any age).
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is stashed.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for ReturnPathStore {
    fn default() -> Self {
        Self::new(ReturnPathConfig::default())
    }
}

/// Generates a random 32-character hex token (128 bits of entropy).
///
/// Unguessable, so a crafted token can't redeem someone else's stashed
/// destination.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `ReturnPathStore`.
    //!
    //! TTL behavior is tested without sleeping: `ttl_secs: 0` makes every
    //! entry expire immediately, `ttl_secs: 3600` makes nothing expire
    //! within a test run.

    use super::*;

    fn store_with_instant_expiry() -> ReturnPathStore {
        ReturnPathStore::new(ReturnPathConfig { ttl_secs: 0 })
    }

    fn store_with_long_ttl() -> ReturnPathStore {
        ReturnPathStore::new(ReturnPathConfig { ttl_secs: 3600 })
    }

    #[test]
    fn test_stash_take_round_trip_returns_path() {
        let mut store = store_with_long_ttl();

        let token = store.stash("/admin/members");

        assert_eq!(token.len(), 32);
        assert_eq!(store.take(&token), Some("/admin/members".to_string()));
    }

    #[test]
    fn test_take_is_single_use() {
        let mut store = store_with_long_ttl();
        let token = store.stash("/events");

        assert!(store.take(&token).is_some());
        assert!(store.take(&token).is_none(), "second take must fail");
    }

    #[test]
    fn test_take_unknown_token_returns_none() {
        let mut store = store_with_long_ttl();
        store.stash("/events");

        assert!(store.take("not-a-real-token").is_none());
    }

    #[test]
    fn test_take_expired_entry_returns_none_and_removes_it() {
        let mut store = store_with_instant_expiry();
        let token = store.stash("/frentes");

        assert!(store.take(&token).is_none(), "expired entry must not redeem");
        assert!(store.is_empty(), "expired entry must be removed on take");
    }

    #[test]
    fn test_stash_multiple_paths_tokens_are_unique() {
        let mut store = store_with_long_ttl();

        let t1 = store.stash("/a");
        let t2 = store.stash("/b");

        assert_ne!(t1, t2, "tokens must be unique per stash");
        assert_eq!(store.take(&t1), Some("/a".to_string()));
        assert_eq!(store.take(&t2), Some("/b".to_string()));
    }

    #[test]
    fn test_purge_expired_drops_only_stale_entries() {
        let mut store = store_with_instant_expiry();
        store.stash("/a");
        store.stash("/b");

        let dropped = store.purge_expired();

        assert_eq!(dropped, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired_keeps_fresh_entries() {
        let mut store = store_with_long_ttl();
        let token = store.stash("/a");

        assert_eq!(store.purge_expired(), 0);
        assert_eq!(store.take(&token), Some("/a".to_string()));
    }

    #[test]
    fn test_len_tracks_stash_count() {
        let mut store = store_with_long_ttl();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());

        store.stash("/a");
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }
}
