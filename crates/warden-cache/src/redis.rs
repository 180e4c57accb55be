//! Redis-backed role cache.
//!
//! Provides async Redis operations with JSON serialization for cached values,
//! and a [`RoleCache`] whose versions are shared by every instance using the
//! same Redis.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

use warden_auth::RoleResolver;
use warden_core::RoleSnapshot;

use crate::keys;
use crate::role_cache::{CacheError, RoleCache};

/// Redis cache client with connection pooling.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: Duration,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Creates a new Redis cache client.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `default_ttl` - Default time-to-live for cached entries
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if connection fails.
    pub async fn new(redis_url: &str, default_ttl: Duration) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn, default_ttl })
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Gets a cached value by key.
    ///
    /// Returns `None` if the key doesn't exist or deserialization fails.
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(value)) => {
                debug!(cache.key = %key, "Cache hit");
                match serde_json::from_str(&value) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        error!(cache.key = %key, error = %e, "Failed to deserialize cached value");
                        None
                    }
                }
            }
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                None
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis GET error");
                None
            }
        }
    }

    /// Reads an integer counter, treating a missing key as zero.
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get_counter(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<u64> = conn.get(key).await?;
        Ok(value.unwrap_or(0))
    }

    /// Sets a cached value with a custom TTL.
    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    pub async fn set_with_ttl<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(value)?;

        conn.set_ex::<_, _, ()>(key, json, ttl.as_secs().max(1)).await?;

        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");

        Ok(())
    }

    /// Invalidates (deletes) a cached key.
    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(key).await?;

        debug!(cache.key = %key, "Cache invalidated");

        Ok(())
    }

    /// Connection handle for scripts and pipelines.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

/// Stores the snapshot only if the version floor is still the one read before
/// resolving. Otherwise a bump raced the lookup: push the floor past the
/// version about to be handed out.
///
/// KEYS: snapshot, floor. ARGV: json, expected floor, ttl seconds, version.
const STORE_SNAPSHOT: &str = r#"
local floor = tonumber(redis.call('GET', KEYS[2]) or '0')
if floor ~= tonumber(ARGV[2]) then
  local next = tonumber(ARGV[4]) + 1
  if floor < next then
    redis.call('SET', KEYS[2], next)
  end
  return 0
end
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[3])
return 1
"#;

/// Raises the floor above both itself and the cached snapshot's version, then
/// evicts the snapshot. Returns the new floor.
///
/// KEYS: snapshot, floor.
const BUMP_VERSION: &str = r#"
local floor = tonumber(redis.call('GET', KEYS[2]) or '0')
local cached = redis.call('GET', KEYS[1])
if cached then
  local ok, snapshot = pcall(cjson.decode, cached)
  if ok and type(snapshot) == 'table' then
    local version = tonumber(snapshot.version)
    if version and version > floor then
      floor = version
    end
  end
end
floor = floor + 1
redis.call('SET', KEYS[2], floor)
redis.call('DEL', KEYS[1])
return floor
"#;

/// Role cache shared through Redis.
///
/// - `<prefix>:user:<id>:roles` holds the JSON snapshot with a TTL
/// - `<prefix>:user:<id>:roles_version` holds the version floor
///
/// Both scripts run atomically on the server, so a bump can never be undone by
/// a lookup that started before it.
#[derive(Clone)]
pub struct RedisRoleCache {
    cache: RedisCache,
    resolver: Arc<dyn RoleResolver>,
    prefix: String,
    store_script: Script,
    bump_script: Script,
}

impl std::fmt::Debug for RedisRoleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRoleCache")
            .field("cache", &self.cache)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl RedisRoleCache {
    pub fn new(cache: RedisCache, resolver: Arc<dyn RoleResolver>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            resolver,
            prefix: prefix.into(),
            store_script: Script::new(STORE_SNAPSHOT),
            bump_script: Script::new(BUMP_VERSION),
        }
    }
}

#[async_trait]
impl RoleCache for RedisRoleCache {
    #[instrument(skip(self), fields(cache.backend = "redis"))]
    async fn lookup(&self, user_id: &str) -> Result<RoleSnapshot, CacheError> {
        let snapshot_key = keys::roles::snapshot(&self.prefix, user_id);
        let version_key = keys::roles::version(&self.prefix, user_id);

        if let Some(snapshot) = self.cache.get::<RoleSnapshot>(&snapshot_key).await {
            return Ok(snapshot);
        }

        let floor = self.cache.get_counter(&version_key).await?;
        let resolved = self.resolver.verify_user_roles(user_id).await?;
        let snapshot = RoleSnapshot::new(resolved.roles, resolved.version.max(floor));

        let json = serde_json::to_string(&snapshot)?;
        let mut conn = self.cache.connection();
        let stored: i64 = self
            .store_script
            .key(&snapshot_key)
            .key(&version_key)
            .arg(json)
            .arg(floor)
            .arg(self.cache.default_ttl().as_secs().max(1))
            .arg(snapshot.version)
            .invoke_async(&mut conn)
            .await?;

        if stored == 0 {
            debug!(user_id = %user_id, "Role version bumped during lookup, not caching");
        }

        Ok(snapshot)
    }

    #[instrument(skip(self), fields(cache.backend = "redis"))]
    async fn bump(&self, user_id: &str) -> Result<u64, CacheError> {
        let mut conn = self.cache.connection();
        let version: u64 = self
            .bump_script
            .key(keys::roles::snapshot(&self.prefix, user_id))
            .key(keys::roles::version(&self.prefix, user_id))
            .invoke_async(&mut conn)
            .await?;

        debug!(cache.version = version, "Role version bumped");
        Ok(version)
    }
}
