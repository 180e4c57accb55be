//! # Warden Cache
//!
//! Versioned role caching for the authorization pipeline.
//!
//! This crate provides:
//! - The [`RoleCache`] capability: `lookup` a user's `(roles, version)` pair and
//!   `bump` the version when the user's roles change
//! - [`MemoryRoleCache`], a process-local backend
//! - [`RedisRoleCache`], a backend shared by every instance pointing at the same Redis
//! - Cache configuration from environment variables
//! - `Cache-Control` header helpers
//!
//! # Versioning
//!
//! Each user has a version floor. A bump raises the floor above every version
//! handed out so far and evicts the cached snapshot, so the next lookup reads
//! fresh roles and reports a strictly greater version. Browsers compare that
//! version with the one they stored and reload when it grew.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_cache::{CacheConfig, MemoryRoleCache, RoleCache};
//!
//! let config = CacheConfig::from_env();
//! let cache = MemoryRoleCache::new(resolver, config.role_ttl());
//!
//! let snapshot = cache.lookup("42").await?;
//! let next = cache.bump("42").await?;
//! assert!(next > snapshot.version);
//! ```

pub mod config;
pub mod http;
pub mod keys;
pub mod memory;
pub mod redis;
pub mod role_cache;

pub use config::{CacheBackend, CacheConfig};
pub use http::{CacheControlConfig, cache_control};
pub use memory::MemoryRoleCache;
pub use redis::{RedisCache, RedisRoleCache};
pub use role_cache::{CacheError, RoleCache};
