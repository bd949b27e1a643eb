//! Core identity types.
//!
//! The auth provider is the source of truth for these values; Portico only
//! carries them around. Nothing here is persisted locally — a fresh
//! [`Identity`] arrives with every sign-in or session-change event.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// The provider-assigned id of a user.
///
/// Newtype over the provider's opaque id string (typically a UUID). Using a
/// named type instead of a bare `String` keeps user ids from being confused
/// with emails, route paths, or return-path tokens in signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The role tag attached to an identity by the auth provider.
///
/// This is the *only* authorization input the guard layer consumes. The
/// derived checks ([`is_admin`](Role::is_admin), [`is_member`](Role::is_member))
/// are computed from the tag at every call site rather than stored as
/// separate flags, so they can never drift out of sync with it.
///
/// Unknown tags from the provider deserialize to [`Role::Guest`] — an
/// unrecognized tier must never grant access by accident.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    /// Full administrative access: member content plus management views.
    Admin,

    /// A confirmed community member: member-tier content.
    Member,

    /// Anyone else — authenticated but not part of the community, or an
    /// unrecognized role tag. Public content only.
    #[default]
    Guest,
}

impl From<String> for Role {
    fn from(tag: String) -> Self {
        Role::from_tag(&tag)
    }
}

impl Role {
    /// Maps a provider role tag to a role. Unknown tags become `Guest`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "admin" => Role::Admin,
            "member" => Role::Member,
            _ => Role::Guest,
        }
    }

    /// Whether this role grants the administrator tier.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role grants the member tier.
    ///
    /// Admins are members too — the tiers nest, they don't partition.
    pub fn is_member(self) -> bool {
        matches!(self, Role::Admin | Role::Member)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Guest => "guest",
        };
        write!(f, "{tag}")
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The authenticated user, as reported by the auth provider.
///
/// Created from a sign-in response or a session-change event payload.
/// Immutable once constructed — a role change at the provider arrives as a
/// fresh `Identity` in a new session snapshot, never as an in-place edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned user id.
    pub id: UserId,

    /// Name shown in the UI (may be empty for legacy accounts).
    #[serde(default)]
    pub display_name: String,

    /// The email the user signed in with.
    pub email: String,

    /// Role tag driving all authorization decisions.
    #[serde(default)]
    pub role: Role,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> ({})", self.id, self.email, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_is_admin_only_for_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Member.is_admin());
        assert!(!Role::Guest.is_admin());
    }

    #[test]
    fn test_role_is_member_includes_admin() {
        assert!(Role::Admin.is_member());
        assert!(Role::Member.is_member());
        assert!(!Role::Guest.is_member());
    }

    #[test]
    fn test_identity_deserializes_from_provider_payload() {
        // Shape of a typical provider session payload.
        let json = r#"{
            "id": "5f1c9a52-7f31-4c0e-9d1a-2b7c6f3e8a40",
            "display_name": "Maria",
            "email": "maria@example.com",
            "role": "member"
        }"#;

        let identity: Identity =
            serde_json::from_str(json).expect("payload should parse");

        assert_eq!(identity.id, UserId::from("5f1c9a52-7f31-4c0e-9d1a-2b7c6f3e8a40"));
        assert_eq!(identity.display_name, "Maria");
        assert_eq!(identity.role, Role::Member);
    }

    #[test]
    fn test_identity_unknown_role_tag_becomes_guest() {
        // A tag this build doesn't know about must not grant anything.
        let json = r#"{
            "id": "u-1",
            "email": "x@example.com",
            "role": "superuser"
        }"#;

        let identity: Identity =
            serde_json::from_str(json).expect("payload should parse");

        assert_eq!(identity.role, Role::Guest);
    }

    #[test]
    fn test_identity_missing_optional_fields_default() {
        // Providers omit display_name/role for minimal accounts.
        let json = r#"{ "id": "u-2", "email": "y@example.com" }"#;

        let identity: Identity =
            serde_json::from_str(json).expect("payload should parse");

        assert_eq!(identity.display_name, "");
        assert_eq!(identity.role, Role::Guest);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        assert_eq!(serde_json::to_string(&Role::Guest).unwrap(), r#""guest""#);
    }
}
