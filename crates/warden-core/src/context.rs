use crate::identity::{Identity, RoleSet, RoleSnapshot};

/// Authorization state of a single request.
///
/// Built once at pipeline entry and inserted into the request extensions so
/// handlers can read it; it is dropped with the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub identity: Option<Identity>,
    pub roles: RoleSet,
    pub roles_version: u64,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity, snapshot: RoleSnapshot) -> Self {
        Self {
            identity: Some(identity),
            roles: snapshot.roles,
            roles_version: snapshot.version,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.id.as_str())
    }
}
