//! The app shell: ties session, guard, and return paths together.
//!
//! This is the entry point for an application embedding Portico. Each
//! navigation flows through [`AppShell::navigate`]:
//!   1. Look up the policy registered for the path
//!   2. Evaluate the guard against the current session snapshot
//!   3. On a login redirect, stash the original destination
//!
//! Session changes pushed by the provider are fed in through
//! [`AppShell::drive_events`], which re-arms the snapshot every consumer
//! reads on its next evaluation.

use std::sync::{Arc, Mutex};

use portico_guard::{
    Decision, GuardConfig, ReturnPathConfig, ReturnPathStore, RouteTable,
    evaluate,
};
use portico_session::{
    AuthEvent, AuthProvider, SessionConfig, SessionSnapshot, SessionStore,
};
use tokio::sync::mpsc;

use crate::PorticoError;

/// The outcome of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// What the caller should do: render, show the loading placeholder, or
    /// follow the redirect.
    pub decision: Decision,

    /// Set when `decision` is a login redirect: the token under which the
    /// original destination was stashed. Carry it through the login flow
    /// and hand it back to [`AppShell::complete_sign_in`].
    pub return_token: Option<String>,
}

/// Builder for configuring an [`AppShell`].
///
/// # Example
///
/// ```rust,ignore
/// use portico::prelude::*;
///
/// let shell = AppShellBuilder::new()
///     .guard_config(GuardConfig::default())
///     .build(my_provider, my_routes);
/// shell.initialize().await;
/// ```
pub struct AppShellBuilder {
    session_config: SessionConfig,
    guard_config: GuardConfig,
    return_path_config: ReturnPathConfig,
}

impl AppShellBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            session_config: SessionConfig::default(),
            guard_config: GuardConfig::default(),
            return_path_config: ReturnPathConfig::default(),
        }
    }

    /// Sets the session resolution config.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the guard destinations (login path, default landing).
    pub fn guard_config(mut self, config: GuardConfig) -> Self {
        self.guard_config = config;
        self
    }

    /// Sets the return-path TTL config.
    pub fn return_path_config(mut self, config: ReturnPathConfig) -> Self {
        self.return_path_config = config;
        self
    }

    /// Builds the shell with the given provider and route table.
    pub fn build<P: AuthProvider>(
        self,
        provider: P,
        routes: RouteTable,
    ) -> AppShell<P> {
        AppShell {
            store: Arc::new(SessionStore::new(provider, self.session_config)),
            routes,
            guard_config: self.guard_config,
            return_paths: Mutex::new(ReturnPathStore::new(
                self.return_path_config,
            )),
        }
    }
}

impl Default for AppShellBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wires the session store, route table, and return-path store into one
/// navigable application core.
///
/// Cheap to share: wrap it in an `Arc` and hand clones to the UI layer and
/// the provider event bridge.
pub struct AppShell<P: AuthProvider> {
    store: Arc<SessionStore<P>>,
    routes: RouteTable,
    guard_config: GuardConfig,
    /// Guarded by a lock because navigations can race with sign-in
    /// completions; the store itself is single-owner and not thread-safe.
    return_paths: Mutex<ReturnPathStore>,
}

impl<P: AuthProvider> AppShell<P> {
    /// Builds a shell with all-default configs. Use
    /// [`AppShellBuilder`] to customize them.
    pub fn new(provider: P, routes: RouteTable) -> Self {
        AppShellBuilder::new().build(provider, routes)
    }

    /// Resolves any existing session. Call once at startup; extra calls
    /// are no-ops (see [`SessionStore::initialize`]).
    pub async fn initialize(&self) -> SessionSnapshot {
        self.store.initialize().await
    }

    /// The session store, for direct subscription or sign-in/out calls.
    pub fn store(&self) -> &Arc<SessionStore<P>> {
        &self.store
    }

    /// Subscribes to session changes. Consumers re-run
    /// [`navigate`](Self::navigate) for their current path whenever the
    /// receiver reports a change.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<SessionSnapshot> {
        self.store.subscribe()
    }

    /// Evaluates the guard for a navigation to `path`.
    ///
    /// When the decision is a redirect to login, the original destination
    /// is stashed and its redemption token returned in
    /// [`Navigation::return_token`].
    ///
    /// # Errors
    /// Returns [`GuardError::UnknownRoute`] (wrapped) for paths with no
    /// registered policy.
    ///
    /// [`GuardError::UnknownRoute`]: portico_guard::GuardError::UnknownRoute
    pub fn navigate(&self, path: &str) -> Result<Navigation, PorticoError> {
        let policy = self.routes.policy_for(path)?;
        let snapshot = self.store.snapshot();
        let decision = evaluate(policy, &snapshot, &self.guard_config);

        tracing::debug!(%path, ?decision, revision = snapshot.revision, "navigation evaluated");

        let return_token = match &decision {
            Decision::Redirect {
                preserve_return_path: true,
                ..
            } => {
                let mut paths = self.lock_return_paths();
                paths.purge_expired();
                Some(paths.stash(path))
            }
            _ => None,
        };

        Ok(Navigation {
            decision,
            return_token,
        })
    }

    /// Signs in and resolves where to go next.
    ///
    /// On success, returns the destination for post-login navigation: the
    /// path stashed under `return_token` if it is still redeemable, the
    /// default landing otherwise. On failure the session is untouched and
    /// the error is returned for user-facing display.
    pub async fn complete_sign_in(
        &self,
        email: &str,
        password: &str,
        return_token: Option<&str>,
    ) -> Result<String, PorticoError> {
        self.store.sign_in(email, password).await?;

        let destination = return_token
            .and_then(|token| self.lock_return_paths().take(token))
            .unwrap_or_else(|| self.guard_config.default_landing.clone());

        tracing::info!(%destination, "sign-in complete");
        Ok(destination)
    }

    /// Signs out. Local state clears even if the provider call fails.
    pub async fn sign_out(&self) -> Result<(), PorticoError> {
        self.store.sign_out().await?;
        Ok(())
    }

    /// Applies provider push events until the channel closes.
    ///
    /// Spawn this on a task with the receiving end of the provider
    /// bridge's channel:
    ///
    /// ```rust,ignore
    /// let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    /// let shell = Arc::new(shell);
    /// tokio::spawn({
    ///     let shell = Arc::clone(&shell);
    ///     async move { shell.drive_events(rx).await }
    /// });
    /// ```
    pub async fn drive_events(
        &self,
        mut events: mpsc::UnboundedReceiver<AuthEvent>,
    ) {
        while let Some(event) = events.recv().await {
            self.store.apply_event(event);
        }
        tracing::debug!("provider event channel closed");
    }

    fn lock_return_paths(&self) -> std::sync::MutexGuard<'_, ReturnPathStore> {
        match self.return_paths.lock() {
            Ok(guard) => guard,
            // A panic while stashing can't leave the map inconsistent;
            // recover the guard and keep going.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
