use async_trait::async_trait;

use warden_auth::AuthError;
use warden_core::RoleSnapshot;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Role resolver error: {0}")]
    Resolver(#[from] AuthError),
}

/// Per-user cache of `(roles, version)` pairs.
///
/// A lookup always returns a pair that was produced together; implementations
/// never combine roles from one read with a version from another.
#[async_trait]
pub trait RoleCache: Send + Sync {
    async fn lookup(&self, user_id: &str) -> Result<RoleSnapshot, CacheError>;

    /// Invalidates the user's roles and returns the new, strictly greater version.
    async fn bump(&self, user_id: &str) -> Result<u64, CacheError>;
}
