//! Session state management for Portico.
//!
//! This crate is the single source of truth for "who is logged in right
//! now":
//!
//! 1. **Provider integration** — talking to the external auth service
//!    ([`AuthProvider`] trait)
//! 2. **Session state** — the current snapshot and its lifecycle
//!    ([`SessionSnapshot`], [`SessionStatus`])
//! 3. **Reactivity** — broadcasting every change to all consumers
//!    ([`SessionStore::subscribe`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Guard Layer (above)  ← reads snapshots to make render/redirect decisions
//!     ↕
//! Session Layer (this crate)  ← owns the authenticated-identity state
//!     ↕
//! Auth Provider (external)  ← resolves sessions, validates credentials
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod provider;
mod session;
mod store;

pub use error::AuthError;
pub use provider::{AuthEvent, AuthProvider};
pub use session::{SessionConfig, SessionSnapshot, SessionStatus};
pub use store::SessionStore;
