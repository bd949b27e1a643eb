//! The session store: the single source of truth for the signed-in user.
//!
//! It is responsible for:
//! - Resolving an existing session at startup (bounded, degrades to anonymous)
//! - Applying session changes pushed by the provider
//! - Running sign-in/sign-out on behalf of UI actions
//! - Broadcasting every change to all subscribed consumers
//!
//! # Concurrency note
//!
//! Multiple provider calls can be in flight at once (a sign-out fired while
//! a sign-in is still resolving). The store never patches fields of the
//! published state from those calls; each completion builds a complete
//! snapshot under the commit lock and replaces the previous one wholesale.
//! The final observed state is the outcome of whichever call completed
//! last, with no mixed fields from stale data.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use portico_identity::Identity;
use tokio::sync::watch;

use crate::{AuthError, AuthEvent, AuthProvider, SessionConfig, SessionSnapshot, SessionStatus};

/// Owns the session snapshot and publishes it to consumers.
///
/// One instance per application, passed by reference (typically in an
/// `Arc`) to every consumer that needs to read or change auth state.
/// Deliberately *not* a process-wide singleton — tests construct isolated
/// stores with mock providers.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ initialize() ──→ apply_event() / sign_in() / sign_out() ...
///   │             │
///   ▼             ▼
/// [Initializing] [Resolved]  ← status never goes back
/// ```
pub struct SessionStore<P: AuthProvider> {
    /// The external auth service.
    provider: P,

    /// Resolution bounds.
    config: SessionConfig,

    /// Publishes snapshots. `watch` keeps only the latest value, which is
    /// exactly the semantics consumers want: the current session, not a
    /// history of sessions.
    tx: watch::Sender<SessionSnapshot>,

    /// Serializes commits and holds the revision counter. Every mutation
    /// path funnels through [`commit`](Self::commit) under this lock, so
    /// revisions are strictly increasing in publication order.
    commit: Mutex<u64>,

    /// Set by the first `initialize` call; later calls are no-ops.
    initialized: AtomicBool,
}

impl<P: AuthProvider> SessionStore<P> {
    /// Creates a store in the `Initializing` state.
    ///
    /// No provider call happens here — call
    /// [`initialize`](Self::initialize) once at application start.
    pub fn new(provider: P, config: SessionConfig) -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::initializing());
        Self {
            provider,
            config,
            tx,
            commit: Mutex::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    /// Resolves any existing session from the provider.
    ///
    /// Idempotent: only the first call queries the provider; every later
    /// call returns the current snapshot without side effects, so wiring
    /// mistakes (two startup paths both initializing) can't produce
    /// duplicate transitions.
    ///
    /// This always settles within `config.resolve_timeout`. Lookup errors
    /// and timeouts degrade to an anonymous resolved session — the rest of
    /// the app must be able to make decisions even when the provider is
    /// down.
    pub async fn initialize(&self) -> SessionSnapshot {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("initialize called more than once — ignoring");
            return self.snapshot();
        }

        let lookup = tokio::time::timeout(
            self.config.resolve_timeout,
            self.provider.current_session(),
        )
        .await;

        match lookup {
            Ok(Ok(identity)) => {
                tracing::info!(
                    authenticated = identity.is_some(),
                    "session resolved"
                );
                self.commit(identity)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    error = %e,
                    "session resolution failed — continuing as anonymous"
                );
                self.commit(None)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.resolve_timeout.as_millis() as u64,
                    "session resolution timed out — continuing as anonymous"
                );
                self.commit(None)
            }
        }
    }

    /// Signs in with email + password.
    ///
    /// On success the new identity is committed through the same path as a
    /// provider push event. On failure the published snapshot is left
    /// exactly as it was and the error goes back to the caller for
    /// user-facing display.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        // Reject obviously empty input locally — no point in a round trip,
        // and the provider error for it is less specific.
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::CredentialsRejected(
                "email and password are required".into(),
            ));
        }

        match self.provider.sign_in_with_password(email, password).await {
            Ok(identity) => {
                tracing::info!(user = %identity.id, role = %identity.role, "signed in");
                self.commit(Some(identity.clone()));
                Ok(identity)
            }
            Err(e) => {
                tracing::debug!(error = %e, "sign-in failed");
                Err(e)
            }
        }
    }

    /// Signs out.
    ///
    /// Local state is cleared even when the remote call fails — the user
    /// asked to leave, and a stale authenticated view must not stick around
    /// because the provider was unreachable. The provider error is still
    /// surfaced so the UI can mention it.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.provider.sign_out().await;
        self.commit(None);
        match result {
            Ok(()) => {
                tracing::info!("signed out");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote sign-out failed; local session cleared");
                Err(e)
            }
        }
    }

    /// Applies a session change pushed by the provider.
    ///
    /// This is the entry point for the provider's event channel: sign-ins
    /// from other tabs, background token refreshes, remote sign-outs.
    pub fn apply_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(identity) => {
                tracing::info!(user = %identity.id, "provider event: signed in");
                self.commit(Some(identity));
            }
            AuthEvent::TokenRefreshed(identity) => {
                tracing::debug!(user = %identity.id, "provider event: token refreshed");
                self.commit(Some(identity));
            }
            AuthEvent::SignedOut => {
                tracing::info!("provider event: signed out");
                self.commit(None);
            }
        }
    }

    /// Subscribes to session changes.
    ///
    /// The receiver always starts with the current snapshot and yields a
    /// change notification for every commit after that.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Builds and publishes a resolved snapshot under the commit lock.
    ///
    /// All mutations funnel through here. The whole snapshot is replaced in
    /// one `send_replace`; subscribers observe either the old value or the
    /// new one, never a mixture. Status is `Resolved` from the first commit
    /// on and never reverts.
    fn commit(&self, identity: Option<Identity>) -> SessionSnapshot {
        let mut revision = match self.commit.lock() {
            Ok(guard) => guard,
            // A poisoned lock only means another commit panicked after
            // bumping the counter; the counter itself is still valid.
            Err(poisoned) => poisoned.into_inner(),
        };
        *revision += 1;

        let snapshot = SessionSnapshot {
            status: SessionStatus::Resolved,
            identity,
            revision: *revision,
        };
        self.tx.send_replace(snapshot.clone());
        snapshot
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionStore`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! # Testing time-dependent behavior
    //!
    //! Resolution timeouts and overlapping provider calls depend on elapsed
    //! time. The tests run under `#[tokio::test(start_paused = true)]`, so
    //! `tokio::time::sleep` inside the mock provider advances virtual time
    //! deterministically — no real sleeping, no flakiness.

    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use portico_identity::{Role, UserId};

    use super::*;

    // -- Mock provider ----------------------------------------------------

    /// How the mock answers the startup session lookup.
    enum Lookup {
        Anonymous,
        Existing(Identity),
        Fail,
        /// Never answers — exercises the resolution timeout.
        Hang,
    }

    struct MockProvider {
        lookup: Lookup,
        lookup_calls: AtomicUsize,
        /// (email, password) pairs that sign in successfully.
        accounts: Vec<(String, String, Identity)>,
        sign_in_delay: Duration,
        sign_out_delay: Duration,
        sign_out_fails: bool,
    }

    impl MockProvider {
        fn new(lookup: Lookup) -> Self {
            Self {
                lookup,
                lookup_calls: AtomicUsize::new(0),
                accounts: vec![(
                    "maria@example.com".into(),
                    "axe".into(),
                    identity("u-maria", Role::Member),
                )],
                sign_in_delay: Duration::ZERO,
                sign_out_delay: Duration::ZERO,
                sign_out_fails: false,
            }
        }
    }

    impl AuthProvider for MockProvider {
        async fn current_session(
            &self,
        ) -> Result<Option<Identity>, AuthError> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            match &self.lookup {
                Lookup::Anonymous => Ok(None),
                Lookup::Existing(identity) => Ok(Some(identity.clone())),
                Lookup::Fail => Err(AuthError::ProviderUnreachable(
                    "connection refused".into(),
                )),
                Lookup::Hang => std::future::pending().await,
            }
        }

        async fn sign_in_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Identity, AuthError> {
            tokio::time::sleep(self.sign_in_delay).await;
            self.accounts
                .iter()
                .find(|(e, p, _)| e == email && p == password)
                .map(|(_, _, identity)| identity.clone())
                .ok_or_else(|| {
                    AuthError::CredentialsRejected("unknown account".into())
                })
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            tokio::time::sleep(self.sign_out_delay).await;
            if self.sign_out_fails {
                Err(AuthError::ProviderUnreachable("gone".into()))
            } else {
                Ok(())
            }
        }
    }

    // -- Helpers ----------------------------------------------------------

    fn identity(id: &str, role: Role) -> Identity {
        Identity {
            id: UserId::from(id),
            display_name: id.to_string(),
            email: format!("{id}@example.com"),
            role,
        }
    }

    fn store(provider: MockProvider) -> SessionStore<MockProvider> {
        SessionStore::new(provider, SessionConfig::default())
    }

    // =====================================================================
    // initialize()
    // =====================================================================

    #[tokio::test]
    async fn test_initialize_existing_session_resolves_authenticated() {
        let s = store(MockProvider::new(Lookup::Existing(identity(
            "u-1",
            Role::Admin,
        ))));

        let snap = s.initialize().await;

        assert_eq!(snap.status, SessionStatus::Resolved);
        assert!(snap.is_authenticated());
        assert!(snap.is_admin());
    }

    #[tokio::test]
    async fn test_initialize_no_session_resolves_anonymous() {
        let s = store(MockProvider::new(Lookup::Anonymous));

        let snap = s.initialize().await;

        assert_eq!(snap.status, SessionStatus::Resolved);
        assert!(!snap.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_lookup_failure_degrades_to_anonymous() {
        // A dead provider must not leave the app stuck on the loading
        // placeholder — it degrades to an anonymous resolved session.
        let s = store(MockProvider::new(Lookup::Fail));

        let snap = s.initialize().await;

        assert_eq!(snap.status, SessionStatus::Resolved);
        assert!(!snap.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_lookup_timeout_degrades_to_anonymous() {
        let s = store(MockProvider::new(Lookup::Hang));

        let snap = s.initialize().await;

        assert_eq!(snap.status, SessionStatus::Resolved);
        assert!(!snap.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_twice_queries_provider_once() {
        let s = store(MockProvider::new(Lookup::Existing(identity(
            "u-1",
            Role::Member,
        ))));

        let first = s.initialize().await;
        let second = s.initialize().await;

        assert_eq!(
            s.provider.lookup_calls.load(Ordering::SeqCst),
            1,
            "second initialize must not hit the provider"
        );
        // Exactly one resolved transition happened.
        assert_eq!(first.revision, 1);
        assert_eq!(second.revision, 1);
    }

    // =====================================================================
    // sign_in()
    // =====================================================================

    #[tokio::test]
    async fn test_sign_in_valid_credentials_commits_identity() {
        let s = store(MockProvider::new(Lookup::Anonymous));
        s.initialize().await;

        let identity = s
            .sign_in("maria@example.com", "axe")
            .await
            .expect("should sign in");

        assert_eq!(identity.id, UserId::from("u-maria"));
        let snap = s.snapshot();
        assert!(snap.is_authenticated());
        assert!(snap.is_member());
    }

    #[tokio::test]
    async fn test_sign_in_rejected_leaves_snapshot_untouched() {
        let s = store(MockProvider::new(Lookup::Anonymous));
        s.initialize().await;
        let before = s.snapshot();

        let result = s.sign_in("maria@example.com", "wrong").await;

        assert!(matches!(result, Err(AuthError::CredentialsRejected(_))));
        assert_eq!(s.snapshot(), before, "failed sign-in must not mutate state");
    }

    #[tokio::test]
    async fn test_sign_in_empty_password_rejected_locally() {
        let s = store(MockProvider::new(Lookup::Anonymous));
        s.initialize().await;
        let before = s.snapshot();

        let result = s.sign_in("maria@example.com", "").await;

        assert!(matches!(result, Err(AuthError::CredentialsRejected(_))));
        assert_eq!(s.snapshot(), before);
    }

    #[tokio::test]
    async fn test_sign_in_does_not_corrupt_previous_session_on_failure() {
        // Already signed in as one user; a failed sign-in attempt for
        // another must keep the first session intact.
        let s = store(MockProvider::new(Lookup::Existing(identity(
            "u-old",
            Role::Member,
        ))));
        s.initialize().await;

        let result = s.sign_in("other@example.com", "nope").await;

        assert!(result.is_err());
        let snap = s.snapshot();
        assert_eq!(
            snap.identity.as_ref().map(|i| i.id.clone()),
            Some(UserId::from("u-old"))
        );
    }

    // =====================================================================
    // sign_out()
    // =====================================================================

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let s = store(MockProvider::new(Lookup::Existing(identity(
            "u-1",
            Role::Member,
        ))));
        s.initialize().await;
        assert!(s.snapshot().is_authenticated());

        s.sign_out().await.expect("should sign out");

        let snap = s.snapshot();
        assert!(!snap.is_authenticated());
        // Still resolved — never back to Initializing.
        assert_eq!(snap.status, SessionStatus::Resolved);
    }

    #[tokio::test]
    async fn test_sign_out_remote_failure_still_clears_local_state() {
        let mut provider =
            MockProvider::new(Lookup::Existing(identity("u-1", Role::Member)));
        provider.sign_out_fails = true;
        let s = store(provider);
        s.initialize().await;

        let result = s.sign_out().await;

        assert!(matches!(result, Err(AuthError::ProviderUnreachable(_))));
        assert!(
            !s.snapshot().is_authenticated(),
            "local session must be cleared even when the provider call fails"
        );
    }

    // =====================================================================
    // apply_event()
    // =====================================================================

    #[tokio::test]
    async fn test_apply_event_signed_in_commits_identity() {
        let s = store(MockProvider::new(Lookup::Anonymous));
        s.initialize().await;

        s.apply_event(AuthEvent::SignedIn(identity("u-tab2", Role::Admin)));

        let snap = s.snapshot();
        assert!(snap.is_admin());
    }

    #[tokio::test]
    async fn test_apply_event_signed_out_clears_identity() {
        let s = store(MockProvider::new(Lookup::Existing(identity(
            "u-1",
            Role::Member,
        ))));
        s.initialize().await;

        s.apply_event(AuthEvent::SignedOut);

        assert!(!s.snapshot().is_authenticated());
        assert_eq!(s.snapshot().status, SessionStatus::Resolved);
    }

    #[tokio::test]
    async fn test_apply_event_token_refresh_picks_up_role_change() {
        let s = store(MockProvider::new(Lookup::Existing(identity(
            "u-1",
            Role::Member,
        ))));
        s.initialize().await;
        assert!(!s.snapshot().is_admin());

        // The refreshed token carries a promoted role.
        s.apply_event(AuthEvent::TokenRefreshed(identity("u-1", Role::Admin)));

        assert!(s.snapshot().is_admin());
    }

    // =====================================================================
    // subscribe() / revisions
    // =====================================================================

    #[tokio::test]
    async fn test_subscribe_observes_every_commit() {
        let s = store(MockProvider::new(Lookup::Anonymous));
        let mut rx = s.subscribe();

        assert_eq!(rx.borrow().status, SessionStatus::Initializing);

        s.initialize().await;
        rx.changed().await.expect("store still alive");
        assert_eq!(rx.borrow_and_update().status, SessionStatus::Resolved);

        s.apply_event(AuthEvent::SignedIn(identity("u-1", Role::Member)));
        rx.changed().await.expect("store still alive");
        assert!(rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn test_revision_strictly_increases_across_transitions() {
        let s = store(MockProvider::new(Lookup::Anonymous));

        let r1 = s.initialize().await.revision;
        s.apply_event(AuthEvent::SignedIn(identity("u-a", Role::Member)));
        let r2 = s.snapshot().revision;
        // Identity-to-identity switch with no anonymous state in between
        // still bumps the revision.
        s.apply_event(AuthEvent::SignedIn(identity("u-b", Role::Member)));
        let r3 = s.snapshot().revision;

        assert!(r1 < r2 && r2 < r3);
    }

    // =====================================================================
    // Overlapping mutations
    // =====================================================================

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_during_pending_sign_in_last_completion_wins() {
        // Sign-in takes 50 ms at the provider; sign-out takes 10 ms. The
        // sign-out settles first, then the sign-in settles and replaces the
        // snapshot — the final state is the sign-in's, whole and unmixed.
        let mut provider = MockProvider::new(Lookup::Anonymous);
        provider.sign_in_delay = Duration::from_millis(50);
        provider.sign_out_delay = Duration::from_millis(10);
        let s = Arc::new(store(provider));
        s.initialize().await;

        let s2 = Arc::clone(&s);
        let sign_in = tokio::spawn(async move {
            s2.sign_in("maria@example.com", "axe").await
        });
        // Let the sign-in task reach its provider call before firing the
        // sign-out.
        tokio::task::yield_now().await;
        s.sign_out().await.expect("sign-out should succeed");

        sign_in
            .await
            .expect("task should not panic")
            .expect("sign-in should succeed");

        let snap = s.snapshot();
        assert!(snap.is_authenticated(), "sign-in completed last and wins");
        assert_eq!(
            snap.identity.as_ref().map(|i| i.id.clone()),
            Some(UserId::from("u-maria"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_sign_out_overwrites_earlier_sign_in() {
        // Mirror case: the sign-out settles after the sign-in, so the final
        // state is anonymous.
        let mut provider = MockProvider::new(Lookup::Anonymous);
        provider.sign_in_delay = Duration::from_millis(10);
        provider.sign_out_delay = Duration::from_millis(50);
        let s = Arc::new(store(provider));
        s.initialize().await;

        let s2 = Arc::clone(&s);
        let sign_out = tokio::spawn(async move { s2.sign_out().await });
        tokio::task::yield_now().await;
        s.sign_in("maria@example.com", "axe")
            .await
            .expect("sign-in should succeed");

        sign_out
            .await
            .expect("task should not panic")
            .expect("sign-out should succeed");

        assert!(
            !s.snapshot().is_authenticated(),
            "sign-out completed last and wins"
        );
    }
}
