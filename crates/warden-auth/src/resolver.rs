//! Role resolution.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use warden_core::{RoleSet, RoleSnapshot};

use crate::error::AuthError;

/// Source of truth for a user's roles and role version.
///
/// Implementations build the returned [`RoleSet`] with
/// [`RoleSet::for_identity`], so the implicit `user` role is always present.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn verify_user_roles(&self, user_id: &str) -> Result<RoleSnapshot, AuthError>;
}

/// In-memory resolver for development and tests.
///
/// Unknown users resolve to the bare `user` role at version 0. Every
/// [`StaticRoleResolver::set_roles`] call bumps that user's version.
#[derive(Debug, Default)]
pub struct StaticRoleResolver {
    assignments: RwLock<HashMap<String, RoleSnapshot>>,
}

impl StaticRoleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the roles of `user_id`, returning the new version.
    pub fn set_roles<I, S>(&self, user_id: &str, roles: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut assignments = self.assignments.write();
        let version = assignments
            .get(user_id)
            .map(|snapshot| snapshot.version + 1)
            .unwrap_or(1);
        assignments.insert(
            user_id.to_string(),
            RoleSnapshot::new(RoleSet::for_identity(roles), version),
        );
        version
    }
}

#[async_trait]
impl RoleResolver for StaticRoleResolver {
    async fn verify_user_roles(&self, user_id: &str) -> Result<RoleSnapshot, AuthError> {
        Ok(self
            .assignments
            .read()
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| RoleSnapshot::new(RoleSet::for_identity(Vec::<String>::new()), 0)))
    }
}
