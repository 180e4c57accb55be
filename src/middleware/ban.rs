use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::{error, info, instrument};

use warden_auth::{AuthProvider, SessionStore};
use warden_core::{GateFailure, Identity};
use warden_observability::{track_ban_enforced, track_gate_failure};

use super::{found, removal_cookie};

/// What happened while enforcing a ban.
#[derive(Debug, Default)]
pub struct BanReport {
    pub sessions_deleted: Option<u64>,
    pub failures: Vec<GateFailure>,
}

impl BanReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Revokes every session of a banned user.
#[derive(Clone)]
pub struct BanEnforcer {
    sessions: Arc<dyn SessionStore>,
    auth: Arc<dyn AuthProvider>,
    /// Cookies cleared on the ban redirect.
    cleared_cookies: Vec<String>,
}

impl BanEnforcer {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        auth: Arc<dyn AuthProvider>,
        cleared_cookies: Vec<String>,
    ) -> Self {
        Self {
            sessions,
            auth,
            cleared_cookies,
        }
    }

    /// Deletes all of the user's sessions and signs out the current credentials.
    ///
    /// Both steps always run; failures are logged and reported, never returned.
    #[instrument(skip(self, identity, headers), fields(user_id = %identity.id))]
    pub async fn enforce(&self, identity: &Identity, headers: &HeaderMap) -> BanReport {
        let mut report = BanReport::default();

        match self.sessions.delete_all_sessions(&identity.id).await {
            Ok(deleted) => report.sessions_deleted = Some(deleted),
            Err(e) => report.failures.push(GateFailure::BanEnforcement(e.into())),
        }

        if let Err(e) = self.auth.sign_out(headers).await {
            report.failures.push(GateFailure::BanEnforcement(e.into()));
        }

        for failure in &report.failures {
            error!(error = %failure, "Ban enforcement step failed");
            track_gate_failure(failure.kind());
        }

        let sessions_deleted = report.sessions_deleted.unwrap_or(0);
        track_ban_enforced(sessions_deleted);
        info!(sessions_deleted, "Banned user signed out");

        report
    }

    /// Redirect that also removes the client's credentials.
    pub fn redirect(&self, location: &str) -> Response {
        let jar = self
            .cleared_cookies
            .iter()
            .fold(CookieJar::new(), |jar, name| jar.add(removal_cookie(name)));

        (jar, found(location)).into_response()
    }
}
