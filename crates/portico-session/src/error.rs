//! Error types for the session layer.

/// Errors that can occur while talking to the auth provider.
///
/// These are returned to the UI action that triggered the call (a sign-in
/// form, a logout button). They never cross the reactive boundary: a failed
/// sign-in leaves the previously published snapshot exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider rejected the credentials (wrong password, unknown
    /// account, or locally rejected empty input).
    #[error("credentials rejected: {0}")]
    CredentialsRejected(String),

    /// The provider could not be reached (network failure, DNS, timeout).
    #[error("auth provider unreachable: {0}")]
    ProviderUnreachable(String),

    /// The provider throttled the request. Try again later.
    #[error("rate limited by auth provider")]
    RateLimited,

    /// Startup session resolution failed. Absorbed inside
    /// [`SessionStore::initialize`](crate::SessionStore::initialize) and
    /// normalized to an anonymous resolved session — callers of `sign_in`
    /// and `sign_out` never see this variant.
    #[error("session resolution failed: {0}")]
    ResolutionFailed(String),
}
