//! Error types for the guard layer.

/// Errors that can occur while resolving routes.
///
/// Note that [`evaluate`](crate::evaluate) itself never fails — an access
/// denial is a redirect decision, not an error. Errors here come from the
/// surrounding machinery (the route table).
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// No policy is registered for the given path.
    #[error("no route registered for path {0:?}")]
    UnknownRoute(String),
}
