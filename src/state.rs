use std::sync::Arc;
use tracing::info;

use warden_auth::{AuthProvider, JwtAuthProvider, RoleResolver, SessionStore};
use warden_cache::{CacheBackend, CacheConfig, MemoryRoleCache, RedisCache, RedisRoleCache, RoleCache};
use warden_config::AppConfig;
use warden_db::{PgRoleResolver, PgSessionStore, init_db_pool};
use warden_observability::MetricsHandle;

use crate::middleware::RequestPipeline;

/// Process-wide components shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<RequestPipeline>,
    pub auth: Arc<dyn AuthProvider>,
    pub sessions: Arc<dyn SessionStore>,
    pub roles: Arc<dyn RoleCache>,
    pub metrics: Option<MetricsHandle>,
}

impl AppState {
    /// Assembles the state from already-built capabilities.
    ///
    /// # Errors
    ///
    /// Fails if a configured route pattern list does not compile.
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthProvider>,
        sessions: Arc<dyn SessionStore>,
        roles: Arc<dyn RoleCache>,
    ) -> anyhow::Result<Self> {
        let pipeline = RequestPipeline::new(&config, auth.clone(), sessions.clone(), roles.clone())?;

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            auth,
            sessions,
            roles,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Option<MetricsHandle>) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Builds the role cache selected by `ROLE_CACHE_BACKEND`.
pub async fn init_role_cache(
    config: &CacheConfig,
    resolver: Arc<dyn RoleResolver>,
) -> anyhow::Result<Arc<dyn RoleCache>> {
    let cache: Arc<dyn RoleCache> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryRoleCache::new(resolver, config.role_ttl())),
        CacheBackend::Redis => {
            let redis = RedisCache::new(&config.redis_url, config.role_ttl()).await?;
            Arc::new(RedisRoleCache::new(redis, resolver, config.key_prefix.clone()))
        }
    };

    info!(backend = ?config.backend, ttl_seconds = config.role_ttl_seconds, "Role cache ready");
    Ok(cache)
}

/// Production state: Postgres sessions and roles, JWT credentials.
pub async fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let pool = init_db_pool().await;
    let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
    let resolver: Arc<dyn RoleResolver> = Arc::new(PgRoleResolver::new(pool));
    let roles = init_role_cache(&CacheConfig::from_env(), resolver).await?;
    let auth: Arc<dyn AuthProvider> =
        Arc::new(JwtAuthProvider::new(config.jwt.clone(), sessions.clone()));

    AppState::new(config, auth, sessions, roles)
}
