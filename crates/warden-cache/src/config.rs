//! Role cache configuration.
//!
//! This module provides configuration for the role cache backend and Redis
//! connection settings loaded from environment variables.

use std::env;
use std::time::Duration;

/// Where role snapshots are cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheBackend {
    /// Process-local map. Each instance keeps its own versions.
    ///
    /// Role changes made outside the server process, such as through
    /// `warden-cli`, cannot bump this cache. They take effect once the cached
    /// snapshot expires, up to `ROLE_CACHE_TTL_SECONDS` later.
    Memory,
    /// Shared Redis keys.
    Redis,
}

/// Role cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `ROLE_CACHE_BACKEND`: `memory` or `redis` (default: `memory`)
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
/// - `ROLE_CACHE_TTL_SECONDS`: how long a role snapshot is served without asking the resolver (default: `60`)
/// - `CACHE_PREFIX`: Prefix for all cache keys (default: `warden`)
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Redis connection URL.
    pub redis_url: String,

    /// Lifetime of a cached role snapshot in seconds.
    pub role_ttl_seconds: u64,

    /// Prefix for all cache keys to avoid collisions.
    pub key_prefix: String,
}

impl CacheConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            backend: match lookup("ROLE_CACHE_BACKEND").as_deref() {
                Some("redis") => CacheBackend::Redis,
                _ => CacheBackend::Memory,
            },
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            role_ttl_seconds: lookup("ROLE_CACHE_TTL_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.role_ttl_seconds),
            key_prefix: lookup("CACHE_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }

    pub fn role_ttl(&self) -> Duration {
        Duration::from_secs(self.role_ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".into(),
            role_ttl_seconds: 60,
            key_prefix: "warden".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::from_vars(|_| None);
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.role_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_redis_backend_selected() {
        let config = CacheConfig::from_vars(|k| match k {
            "ROLE_CACHE_BACKEND" => Some("redis".into()),
            "ROLE_CACHE_TTL_SECONDS" => Some("5".into()),
            _ => None,
        });
        assert_eq!(config.backend, CacheBackend::Redis);
        assert_eq!(config.role_ttl_seconds, 5);
    }
}
