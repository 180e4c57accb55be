//! Identity and role value types.
//!
//! Role sets are immutable: any change to a user's roles produces a new
//! [`RoleSnapshot`] with a higher version rather than mutating an existing one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Implicit role held by every resolved identity.
pub const ROLE_USER: &str = "user";
/// Grants access to admin-class routes.
pub const ROLE_ADMIN: &str = "admin";
/// Revokes all access and triggers session destruction.
pub const ROLE_BANNED: &str = "banned";

/// An authenticated user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: display_name.into(),
        }
    }
}

/// Set of role names. Duplicates collapse and iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// The empty set carried by anonymous requests.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Builds the role set of a resolved identity, always including [`ROLE_USER`].
    pub fn for_identity<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: BTreeSet<String> = roles.into_iter().map(Into::into).collect();
        set.insert(ROLE_USER.to_string());
        Self(set)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.contains(ROLE_ADMIN)
    }

    pub fn is_banned(&self) -> bool {
        self.contains(ROLE_BANNED)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{}", names.join(","))
    }
}

/// A role set paired with the version it was read at.
///
/// The pair is always stored and handed out as one value so no reader can see
/// new roles with an old version or the reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    pub roles: RoleSet,
    pub version: u64,
}

impl RoleSnapshot {
    pub fn new(roles: RoleSet, version: u64) -> Self {
        Self { roles, version }
    }
}
