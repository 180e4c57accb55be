use async_trait::async_trait;
use axum::http::HeaderMap;

use warden_core::Identity;

use crate::error::AuthError;

/// A live session resolved from request credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub session_id: String,
}

/// Resolves request credentials to a session and revokes them.
///
/// Both operations must be safe to call when the request carries no
/// credentials at all: `get_session` then returns `Ok(None)` and `sign_out`
/// does nothing.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self, headers: &HeaderMap) -> Result<(), AuthError>;
}
