//! Unified error type for the Portico core.

use portico_guard::GuardError;
use portico_session::AuthError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `portico` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PorticoError {
    /// An auth-layer error (credentials, provider connectivity).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A guard-layer error (unregistered route).
    #[error(transparent)]
    Guard(#[from] GuardError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_auth_error() {
        let err = AuthError::CredentialsRejected("nope".into());
        let portico_err: PorticoError = err.into();
        assert!(matches!(portico_err, PorticoError::Auth(_)));
        assert!(portico_err.to_string().contains("nope"));
    }

    #[test]
    fn test_from_guard_error() {
        let err = GuardError::UnknownRoute("/ghost".into());
        let portico_err: PorticoError = err.into();
        assert!(matches!(portico_err, PorticoError::Guard(_)));
        assert!(portico_err.to_string().contains("/ghost"));
    }
}
