//! Auth provider hook: the seam between Portico and the external service.
//!
//! Portico doesn't implement authentication itself — that's the managed
//! backend's job (Supabase, Firebase, a custom JWT service, whatever the
//! deployment uses). This module defines the [`AuthProvider`] trait the
//! session store calls, and the [`AuthEvent`] payloads the provider pushes
//! back when the session changes underneath us (token refresh, sign-out in
//! another tab).
//!
//! Swapping the implementation swaps the backend: a real HTTP client in
//! production, an in-memory user table in development, a scripted mock in
//! tests — with no change to the store.

use portico_identity::Identity;

use crate::AuthError;

/// A session change pushed by the auth provider.
///
/// Providers emit these outside of any direct call from this process:
/// a background token refresh, a sign-out from another tab or device, or
/// the initial restore of a persisted session. The bridge listening on the
/// provider's channel forwards each one to
/// [`SessionStore::apply_event`](crate::SessionStore::apply_event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A session became active (fresh sign-in or restored session).
    SignedIn(Identity),

    /// The session's token was refreshed. Carries the full identity again
    /// because the provider may have picked up profile or role changes.
    TokenRefreshed(Identity),

    /// The session ended.
    SignedOut,
}

/// Talks to the external auth service.
///
/// # Trait bounds
///
/// - `Send + Sync` → the provider is shared across async tasks.
/// - `'static` → it doesn't borrow temporary data; it lives as long as the
///   session store that owns it.
///
/// # Example
///
/// ```rust
/// use portico_identity::{Identity, Role, UserId};
/// use portico_session::{AuthError, AuthProvider};
///
/// /// Accepts one hard-coded account. Development only.
/// struct DevProvider;
///
/// impl AuthProvider for DevProvider {
///     async fn current_session(
///         &self,
///     ) -> Result<Option<Identity>, AuthError> {
///         Ok(None)
///     }
///
///     async fn sign_in_with_password(
///         &self,
///         email: &str,
///         password: &str,
///     ) -> Result<Identity, AuthError> {
///         if email == "dev@example.com" && password == "dev" {
///             Ok(Identity {
///                 id: UserId::from("dev-1"),
///                 display_name: "Dev".into(),
///                 email: email.into(),
///                 role: Role::Admin,
///             })
///         } else {
///             Err(AuthError::CredentialsRejected("unknown account".into()))
///         }
///     }
///
///     async fn sign_out(&self) -> Result<(), AuthError> {
///         Ok(())
///     }
/// }
/// ```
pub trait AuthProvider: Send + Sync + 'static {
    /// Looks up an existing session (e.g., from a persisted refresh token).
    ///
    /// Called once at startup by
    /// [`SessionStore::initialize`](crate::SessionStore::initialize).
    ///
    /// # Returns
    /// - `Ok(Some(identity))` — a session already exists
    /// - `Ok(None)` — nobody is signed in
    /// - `Err(_)` — lookup failed; the store degrades to anonymous
    fn current_session(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<Identity>, AuthError>> + Send;

    /// Validates credentials and opens a session.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<Identity, AuthError>> + Send;

    /// Closes the current session on the provider side.
    fn sign_out(
        &self,
    ) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;
}
