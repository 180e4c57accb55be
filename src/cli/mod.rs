//! Administrative operations behind the `warden-cli` binary.
//!
//! Role changes are written to Postgres (bumping `users.roles_version`) and,
//! when the shared Redis role cache is configured, bumped there too so every
//! server instance sees the change on its next request.

use std::sync::Arc;
use tracing::info;

use warden_auth::{JwtAuthProvider, SessionStore};
use warden_cache::{CacheBackend, CacheConfig, RedisCache, RedisRoleCache, RoleCache};
use warden_config::JwtConfig;
use warden_core::{Identity, ROLE_BANNED};
use warden_db::{PgPool, PgRoleResolver, PgSessionStore, users};

/// Warning shown after a role change when running servers cannot be told
/// about it.
pub fn stale_roles_warning(cache: &CacheConfig) -> Option<String> {
    match cache.backend {
        CacheBackend::Redis => None,
        CacheBackend::Memory => Some(format!(
            "Warning: ROLE_CACHE_BACKEND is memory; running servers keep the old roles for up to {} second(s)",
            cache.role_ttl_seconds
        )),
    }
}

/// Result of banning a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanSummary {
    pub roles_version: u64,
    pub sessions_deleted: u64,
}

pub struct AdminTools {
    pool: PgPool,
    resolver: PgRoleResolver,
    sessions: Arc<PgSessionStore>,
    shared_cache: Option<RedisRoleCache>,
}

impl AdminTools {
    pub async fn connect(pool: PgPool, cache: &CacheConfig) -> anyhow::Result<Self> {
        let resolver = PgRoleResolver::new(pool.clone());

        let shared_cache = match cache.backend {
            CacheBackend::Redis => {
                let redis = RedisCache::new(&cache.redis_url, cache.role_ttl()).await?;
                Some(RedisRoleCache::new(
                    redis,
                    Arc::new(resolver.clone()),
                    cache.key_prefix.clone(),
                ))
            }
            CacheBackend::Memory => None,
        };

        Ok(Self {
            sessions: Arc::new(PgSessionStore::new(pool.clone())),
            pool,
            resolver,
            shared_cache,
        })
    }

    pub async fn create_user(&self, email: &str, display_name: &str) -> anyhow::Result<Identity> {
        Ok(users::create_user(&self.pool, email, display_name).await?)
    }

    /// Creates a session row and returns a token bound to it.
    pub async fn issue_session(&self, user_id: &str, jwt: JwtConfig) -> anyhow::Result<String> {
        let identity = users::find_identity(&self.pool, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {} not found", user_id))?;

        let provider = JwtAuthProvider::new(jwt, self.sessions.clone());
        Ok(provider.issue_session(&identity).await?)
    }

    pub async fn assign_role(&self, user_id: &str, role: &str) -> anyhow::Result<u64> {
        let version = self.resolver.assign_role(user_id, role).await?;
        self.bump_shared(user_id, version).await
    }

    pub async fn revoke_role(&self, user_id: &str, role: &str) -> anyhow::Result<u64> {
        let version = self.resolver.revoke_role(user_id, role).await?;
        self.bump_shared(user_id, version).await
    }

    pub async fn bump_roles(&self, user_id: &str) -> anyhow::Result<u64> {
        let version = self.resolver.bump_version(user_id).await?;
        self.bump_shared(user_id, version).await
    }

    pub async fn revoke_sessions(&self, user_id: &str) -> anyhow::Result<u64> {
        let deleted = self.sessions.delete_all_sessions(user_id).await?;
        info!(user_id = %user_id, deleted, "Sessions revoked");
        Ok(deleted)
    }

    /// Assigns the `banned` role and deletes every session of the user.
    pub async fn ban(&self, user_id: &str) -> anyhow::Result<BanSummary> {
        let roles_version = self.assign_role(user_id, ROLE_BANNED).await?;
        let sessions_deleted = self.revoke_sessions(user_id).await?;

        Ok(BanSummary {
            roles_version,
            sessions_deleted,
        })
    }

    /// Raises the shared cache's version too; returns the larger of the two.
    async fn bump_shared(&self, user_id: &str, db_version: u64) -> anyhow::Result<u64> {
        match &self.shared_cache {
            Some(cache) => Ok(cache.bump(user_id).await?.max(db_version)),
            None => Ok(db_version),
        }
    }
}
