//! Identity and role types for Portico.
//!
//! These are the types every other layer speaks: who a user is
//! ([`Identity`]), which tier they belong to ([`Role`]), and the opaque
//! id the auth provider assigned them ([`UserId`]). They deserialize
//! directly from the provider's JSON payloads, so the session layer never
//! hand-parses provider responses.

mod types;

pub use types::{Identity, Role, UserId};
