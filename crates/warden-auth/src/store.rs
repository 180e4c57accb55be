//! Server-side session records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AuthError;

/// Storage for server-side session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a session for `user_id` and returns its id.
    async fn create_session(
        &self,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError>;

    /// True if the session exists and has not expired.
    async fn is_active(&self, session_id: &str) -> Result<bool, AuthError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), AuthError>;

    /// Deletes every session of `user_id`, returning how many were removed.
    async fn delete_all_sessions(&self, user_id: &str) -> Result<u64, AuthError>;
}

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: String,
    expires_at: DateTime<Utc>,
}

/// Process-local session store. State is lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions held for `user_id`.
    pub fn count_for(&self, user_id: &str) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .values()
            .filter(|record| record.user_id == user_id && record.expires_at > now)
            .count()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_session(
        &self,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let session_id = Uuid::new_v4().to_string();
        self.sessions.write().insert(
            session_id.clone(),
            SessionRecord {
                user_id: user_id.to_string(),
                expires_at,
            },
        );
        Ok(session_id)
    }

    async fn is_active(&self, session_id: &str) -> Result<bool, AuthError> {
        Ok(self
            .sessions
            .read()
            .get(session_id)
            .is_some_and(|record| record.expires_at > Utc::now()))
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), AuthError> {
        self.sessions.write().remove(session_id);
        Ok(())
    }

    async fn delete_all_sessions(&self, user_id: &str) -> Result<u64, AuthError> {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, record| record.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }
}
