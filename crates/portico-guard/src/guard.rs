//! The guard: one pure function from (policy, session) to a decision.

use portico_session::SessionSnapshot;

use crate::RoutePolicy;

// ---------------------------------------------------------------------------
// GuardConfig
// ---------------------------------------------------------------------------

/// App-wide destinations the guard redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Where unauthenticated users are sent when a view requires auth.
    pub login_path: String,

    /// Where denied (but authenticated) users and signed-in visitors of
    /// anonymous-only pages are sent, unless the policy overrides it.
    pub default_landing: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            default_landing: "/".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// The guard's verdict for one render attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The view may render.
    Render,

    /// The session hasn't resolved yet — render the loading placeholder
    /// and re-evaluate on the next session change.
    ShowLoading,

    /// Send the user elsewhere.
    Redirect {
        /// Destination path.
        target: String,

        /// Whether the original destination should be stashed so the user
        /// can be brought back after signing in. Only set on redirects to
        /// the login page.
        preserve_return_path: bool,
    },
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

/// Decides what happens when a view with `policy` is rendered under
/// `session`.
///
/// Pure: no state is held between evaluations; callers re-run it on every
/// session change and every navigation. It never fails — denial is a
/// redirect, not an error.
///
/// The check order is load-bearing:
///
/// 1. An unresolved session always wins — deciding access from a
///    provisional answer would flash a redirect at users who are actually
///    signed in.
/// 2. Anonymous-only pages are checked before any auth requirement, so a
///    signed-in user visiting `/login` goes home instead of looping.
/// 3. The auth check runs before the tier checks; only the auth redirect
///    preserves the return path, because only it leads somewhere the user
///    can fix the problem (by signing in). A missing *tier* can't be fixed
///    at the login page — those denials go to the landing page.
pub fn evaluate(
    policy: &RoutePolicy,
    session: &SessionSnapshot,
    config: &GuardConfig,
) -> Decision {
    if !session.is_resolved() {
        return Decision::ShowLoading;
    }

    if policy.restricted_to_anonymous && session.is_authenticated() {
        return landing(policy, config);
    }

    if policy.require_auth && !session.is_authenticated() {
        tracing::debug!(login = %config.login_path, "unauthenticated — redirecting to login");
        return Decision::Redirect {
            target: config.login_path.clone(),
            preserve_return_path: true,
        };
    }

    if policy.require_admin && !session.is_admin() {
        tracing::debug!(role = %session.role(), "admin tier required — redirecting");
        return landing(policy, config);
    }

    if policy.require_member && !session.is_member() {
        tracing::debug!(role = %session.role(), "member tier required — redirecting");
        return landing(policy, config);
    }

    Decision::Render
}

/// Redirect to the policy's fallback, or the app-wide landing page.
fn landing(policy: &RoutePolicy, config: &GuardConfig) -> Decision {
    Decision::Redirect {
        target: policy
            .fallback
            .clone()
            .unwrap_or_else(|| config.default_landing.clone()),
        preserve_return_path: false,
    }
}
