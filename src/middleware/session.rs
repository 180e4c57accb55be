use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::{debug, warn};

use warden_auth::AuthProvider;
use warden_cache::RoleCache;
use warden_core::{GateFailure, RequestContext};
use warden_observability::track_gate_failure;

/// Turns request credentials into a [`RequestContext`].
///
/// Any failure along the way (provider, role cache) degrades the request to
/// anonymous instead of failing it.
#[derive(Clone)]
pub struct SessionResolver {
    auth: Arc<dyn AuthProvider>,
    roles: Arc<dyn RoleCache>,
}

impl SessionResolver {
    pub fn new(auth: Arc<dyn AuthProvider>, roles: Arc<dyn RoleCache>) -> Self {
        Self { auth, roles }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> RequestContext {
        match self.try_resolve(headers).await {
            Ok(ctx) => ctx,
            Err(failure) => {
                warn!(kind = failure.kind(), error = %failure, "Treating request as anonymous");
                track_gate_failure(failure.kind());
                RequestContext::anonymous()
            }
        }
    }

    async fn try_resolve(&self, headers: &HeaderMap) -> Result<RequestContext, GateFailure> {
        let session = self
            .auth
            .get_session(headers)
            .await
            .map_err(|e| GateFailure::SessionResolution(e.into()))?;

        let Some(session) = session else {
            return Ok(RequestContext::anonymous());
        };

        let snapshot = self
            .roles
            .lookup(&session.identity.id)
            .await
            .map_err(|e| GateFailure::SessionResolution(e.into()))?;

        debug!(
            user_id = %session.identity.id,
            roles = %snapshot.roles,
            roles_version = snapshot.version,
            "Session resolved"
        );

        Ok(RequestContext::authenticated(session.identity, snapshot))
    }
}
