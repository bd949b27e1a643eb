//! # Portico
//!
//! Session-gated navigation core for community web apps.
//!
//! Portico provides the authorization spine of a client application: a
//! reactive session store fed by an external auth provider, a pure route
//! guard with a fixed precedence order, and the wiring between them —
//! including return-path preservation across the login flow.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portico::prelude::*;
//!
//! // Implement AuthProvider for your backend, then:
//! // let routes = RouteTable::new()
//! //     .with("/", RoutePolicy::public())
//! //     .with("/login", RoutePolicy::anonymous_only())
//! //     .with("/admin", RoutePolicy::admin_only());
//! // let shell = AppShell::new(my_provider, routes);
//! // shell.initialize().await;
//! // match shell.navigate("/admin")?.decision { /* render / redirect */ }
//! ```

mod app;
mod error;

pub use app::{AppShell, AppShellBuilder, Navigation};
pub use error::PorticoError;

/// The commonly used surface, re-exported in one place.
pub mod prelude {
    pub use portico_guard::{
        Decision, GuardConfig, ReturnPathConfig, RoutePolicy, RouteTable,
    };
    pub use portico_identity::{Identity, Role, UserId};
    pub use portico_session::{
        AuthError, AuthEvent, AuthProvider, SessionConfig, SessionSnapshot,
        SessionStatus,
    };

    pub use crate::{AppShell, AppShellBuilder, Navigation, PorticoError};
}
