//! JWT-backed [`AuthProvider`].
//!
//! Credentials are read from `Authorization: Bearer <token>` first and from the
//! session cookie second. A token authenticates only while its `sid` is live in
//! the [`SessionStore`], which is what makes deleting a user's sessions revoke
//! tokens that are still within their expiry.

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use warden_config::JwtConfig;
use warden_core::Identity;

use crate::error::AuthError;
use crate::jwt::{create_session_token, verify_session_token};
use crate::provider::{AuthProvider, Session};
use crate::store::SessionStore;

#[derive(Clone)]
pub struct JwtAuthProvider {
    config: JwtConfig,
    sessions: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for JwtAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthProvider")
            .field("cookie_name", &self.config.cookie_name)
            .finish_non_exhaustive()
    }
}

impl JwtAuthProvider {
    pub fn new(config: JwtConfig, sessions: Arc<dyn SessionStore>) -> Self {
        Self { config, sessions }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Creates a session record for `identity` and returns a token bound to it.
    pub async fn issue_session(&self, identity: &Identity) -> Result<String, AuthError> {
        let expires_at = Utc::now() + Duration::seconds(self.config.session_expiry);
        let session_id = self
            .sessions
            .create_session(&identity.id, expires_at)
            .await?;

        create_session_token(identity, &session_id, &self.config)
    }

    fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
            return Some(bearer.token().to_string());
        }

        CookieJar::from_headers(headers)
            .get(&self.config.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthError> {
        let Some(token) = self.token_from_headers(headers) else {
            return Ok(None);
        };

        let claims = match verify_session_token(&token, &self.config) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Ignoring unusable session token");
                return Ok(None);
            }
        };

        if !self.sessions.is_active(&claims.sid).await? {
            debug!(user_id = %claims.sub, "Session token refers to a revoked session");
            return Ok(None);
        }

        Ok(Some(Session {
            identity: claims.identity(),
            session_id: claims.sid,
        }))
    }

    async fn sign_out(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let Some(token) = self.token_from_headers(headers) else {
            return Ok(());
        };

        match verify_session_token(&token, &self.config) {
            Ok(claims) => self.sessions.delete_session(&claims.sid).await,
            Err(_) => Ok(()),
        }
    }
}
