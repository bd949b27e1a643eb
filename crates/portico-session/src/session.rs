//! Session types: the data structures that represent the current
//! authentication state.
//!
//! A snapshot answers four questions for a consumer:
//! - HAS the initial session lookup finished ([`SessionStatus`])
//! - WHO is signed in, if anyone ([`Identity`])
//! - WHICH tiers that grants (derived from the role tag)
//! - DID the state change since I last looked (`revision`)

use std::time::Duration;

use portico_identity::{Identity, Role};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session resolution behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound on the startup session lookup. If the provider hasn't
    /// answered within this window, the store gives up and publishes an
    /// anonymous resolved snapshot — consumers must never be left staring
    /// at a loading placeholder forever.
    ///
    /// Default: 10 seconds.
    pub resolve_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_secs(10),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// A two-state machine with a one-way transition:
///
/// ```text
///   Initializing ──(startup lookup settles)──→ Resolved
/// ```
///
/// - **Initializing**: the startup lookup hasn't settled. Any answer read
///   now is provisional — consumers render a loading placeholder, never an
///   access decision.
/// - **Resolved**: the lookup settled (with or without an identity). All
///   later transitions (sign-in, sign-out, token refresh) stay `Resolved`;
///   the status only returns to `Initializing` on a fresh process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The startup session lookup is still in flight.
    Initializing,

    /// The session state is authoritative.
    Resolved,
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// The current authentication state, published as one immutable value.
///
/// Every mutation replaces the whole snapshot — consumers can never observe
/// a half-updated state (an old identity with a new status, say), because
/// there is no way to patch one field of a published snapshot.
///
/// The role checks are methods over [`Identity::role`] rather than stored
/// booleans, so they cannot drift from the tag they derive from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Lifecycle status — gate on this before trusting `identity`.
    pub status: SessionStatus,

    /// The signed-in user, or `None` for an anonymous session.
    pub identity: Option<Identity>,

    /// Bumped on every committed change. Two snapshots with different
    /// identities always carry different revisions, so a consumer diffing
    /// what it saw last can detect every transition, including
    /// identity-to-identity switches with no anonymous state in between.
    pub revision: u64,
}

impl SessionSnapshot {
    /// The state every store starts in: unresolved and anonymous.
    pub(crate) fn initializing() -> Self {
        Self {
            status: SessionStatus::Initializing,
            identity: None,
            revision: 0,
        }
    }

    /// Whether the startup lookup has settled.
    pub fn is_resolved(&self) -> bool {
        self.status == SessionStatus::Resolved
    }

    /// Whether someone is signed in.
    ///
    /// Always consistent with `identity` — this is `identity.is_some()`,
    /// nothing more.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The current role tag (`Guest` when anonymous).
    pub fn role(&self) -> Role {
        self.identity.as_ref().map(|i| i.role).unwrap_or_default()
    }

    /// Whether the session grants the administrator tier.
    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    /// Whether the session grants the member tier (admins included).
    pub fn is_member(&self) -> bool {
        self.role().is_member()
    }
}
