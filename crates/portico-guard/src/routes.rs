//! The route table: the app's single declaration point for policies.
//!
//! The source material this replaces had two half-overlapping protection
//! wrappers scattered across views; collecting every (path, policy) pair in
//! one table is what makes the tiered model the single source of truth.

use std::collections::HashMap;

use crate::{GuardError, RoutePolicy};

/// Maps route paths to the policies protecting them.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, RoutePolicy>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy for a path. Re-registering a path replaces its
    /// previous policy.
    pub fn register(
        &mut self,
        path: impl Into<String>,
        policy: RoutePolicy,
    ) -> &mut Self {
        let path = path.into();
        tracing::debug!(%path, ?policy, "route registered");
        self.routes.insert(path, policy);
        self
    }

    /// Builder-style [`register`](Self::register) for table literals.
    pub fn with(mut self, path: impl Into<String>, policy: RoutePolicy) -> Self {
        self.register(path, policy);
        self
    }

    /// Looks up the policy for a path.
    ///
    /// # Errors
    /// Returns [`GuardError::UnknownRoute`] for unregistered paths — a
    /// missing registration is a wiring bug, not an access denial.
    pub fn policy_for(&self, path: &str) -> Result<&RoutePolicy, GuardError> {
        self.routes
            .get(path)
            .ok_or_else(|| GuardError::UnknownRoute(path.to_string()))
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
