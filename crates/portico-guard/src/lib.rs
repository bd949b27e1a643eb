//! Route protection for Portico.
//!
//! This crate turns a per-view [`RoutePolicy`] plus the current session
//! snapshot into a render decision:
//!
//! 1. **Policies** — declarative access requirements ([`RoutePolicy`])
//! 2. **The guard** — one pure decision function with a fixed precedence
//!    order ([`evaluate`])
//! 3. **Route table** — the app's single declaration point for which path
//!    carries which policy ([`RouteTable`])
//! 4. **Return paths** — stashing the original destination across a login
//!    redirect ([`ReturnPathStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! App Shell (above)  ← runs the guard on every navigation and session change
//!     ↕
//! Guard Layer (this crate)  ← maps (policy, session) to a decision
//!     ↕
//! Session Layer (below)  ← provides the SessionSnapshot being judged
//! ```

mod error;
mod guard;
mod policy;
mod return_path;
mod routes;

pub use error::GuardError;
pub use guard::{Decision, GuardConfig, evaluate};
pub use policy::RoutePolicy;
pub use return_path::{ReturnPathConfig, ReturnPathStore};
pub use routes::RouteTable;
