//! Route policies: declarative per-view access requirements.

use serde::{Deserialize, Serialize};

/// The access requirement a view declares for itself.
///
/// Supplied once per route and immutable for the lifetime of that view's
/// render — the guard re-reads the *session* on every evaluation, never the
/// policy.
///
/// The flags are not validated against each other. A policy that sets both
/// `restricted_to_anonymous` and `require_auth` is a caller mistake; the
/// guard still behaves deterministically (the anonymous-only check runs
/// first, see [`evaluate`](crate::evaluate)), it just isn't a combination
/// any real view wants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePolicy {
    /// The view requires a signed-in user of any role.
    pub require_auth: bool,

    /// The view requires the administrator tier.
    pub require_admin: bool,

    /// The view requires the member tier (admins qualify).
    pub require_member: bool,

    /// The view is only for anonymous visitors (login, registration).
    /// Signed-in users get bounced to the landing page instead.
    pub restricted_to_anonymous: bool,

    /// Where to send a user this policy turns away, overriding the guard's
    /// default landing. `None` uses [`GuardConfig::default_landing`]
    /// (login redirects always go to [`GuardConfig::login_path`]).
    ///
    /// [`GuardConfig::default_landing`]: crate::GuardConfig::default_landing
    /// [`GuardConfig::login_path`]: crate::GuardConfig::login_path
    pub fallback: Option<String>,
}

impl RoutePolicy {
    /// No requirements: everyone renders, signed in or not.
    pub fn public() -> Self {
        Self::default()
    }

    /// Requires any signed-in user.
    pub fn authenticated() -> Self {
        Self {
            require_auth: true,
            ..Self::default()
        }
    }

    /// Requires the administrator tier.
    ///
    /// Implies `require_auth`: an anonymous visitor is sent to login (with
    /// their destination preserved) rather than silently bounced to the
    /// landing page.
    pub fn admin_only() -> Self {
        Self {
            require_auth: true,
            require_admin: true,
            ..Self::default()
        }
    }

    /// Requires the member tier. Implies `require_auth`, same as
    /// [`admin_only`](Self::admin_only).
    pub fn members_only() -> Self {
        Self {
            require_auth: true,
            require_member: true,
            ..Self::default()
        }
    }

    /// Only for anonymous visitors (login and registration pages).
    pub fn anonymous_only() -> Self {
        Self {
            restricted_to_anonymous: true,
            ..Self::default()
        }
    }

    /// Overrides the redirect destination for denials under this policy.
    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = Some(path.into());
        self
    }
}
