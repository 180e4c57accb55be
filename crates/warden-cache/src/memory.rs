//! Process-local role cache.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use warden_auth::RoleResolver;
use warden_core::RoleSnapshot;

use crate::role_cache::{CacheError, RoleCache};

#[derive(Debug, Default)]
struct Entry {
    cached: Option<(RoleSnapshot, Instant)>,
    /// Lowest version this entry may hand out. Only bumps raise it.
    floor: u64,
}

/// Role cache backed by a map behind a [`RwLock`].
///
/// The lock is only held for map access, never across resolver I/O. A
/// snapshot is replaced as a whole, so readers see either the old or the new
/// `(roles, version)` pair.
///
/// Expired snapshots are evicted on the write path, at most once per TTL.
/// Entries that were never bumped are dropped with their snapshot; bumped ones
/// keep only their floor.
pub struct MemoryRoleCache {
    resolver: Arc<dyn RoleResolver>,
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
    swept_at: Mutex<Instant>,
}

impl std::fmt::Debug for MemoryRoleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRoleCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.read().len())
            .finish_non_exhaustive()
    }
}

impl MemoryRoleCache {
    pub fn new(resolver: Arc<dyn RoleResolver>, ttl: Duration) -> Self {
        Self {
            resolver,
            ttl,
            entries: RwLock::new(HashMap::new()),
            swept_at: Mutex::new(Instant::now()),
        }
    }

    fn evict_expired(&self, entries: &mut HashMap<String, Entry>) {
        let now = Instant::now();
        {
            let mut swept_at = self.swept_at.lock();
            if now.duration_since(*swept_at) < self.ttl {
                return;
            }
            *swept_at = now;
        }

        let before = entries.len();
        entries.retain(|_, entry| {
            if let Some((snapshot, at)) = &entry.cached {
                if now.duration_since(*at) < self.ttl {
                    return true;
                }
                // The expired version was handed out; later ones must not go below it.
                let version = snapshot.version;
                if entry.floor > 0 {
                    entry.floor = entry.floor.max(version);
                }
                entry.cached = None;
            }
            entry.floor > 0
        });

        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = entries.len(), "Evicted expired role snapshots");
        }
    }

    /// Returns a fresh cached snapshot, or the floor a new snapshot must respect.
    fn cached(&self, user_id: &str) -> Result<RoleSnapshot, u64> {
        let entries = self.entries.read();
        match entries.get(user_id) {
            Some(Entry {
                cached: Some((snapshot, at)),
                ..
            }) if at.elapsed() < self.ttl => Ok(snapshot.clone()),
            Some(entry) => Err(entry.floor),
            None => Err(0),
        }
    }
}

#[async_trait]
impl RoleCache for MemoryRoleCache {
    #[instrument(skip(self), fields(cache.backend = "memory"))]
    async fn lookup(&self, user_id: &str) -> Result<RoleSnapshot, CacheError> {
        let floor = match self.cached(user_id) {
            Ok(snapshot) => {
                debug!(cache.version = snapshot.version, "Role cache hit");
                return Ok(snapshot);
            }
            Err(floor) => floor,
        };

        let resolved = self.resolver.verify_user_roles(user_id).await?;
        let snapshot = RoleSnapshot::new(resolved.roles, resolved.version.max(floor));

        let mut entries = self.entries.write();
        let entry = entries.entry(user_id.to_string()).or_default();
        // Bumped while the resolver was queried: the roles read may predate the
        // change, so hand them out once but make the next version greater.
        if entry.floor != floor {
            entry.floor = entry.floor.max(snapshot.version + 1);
            debug!(user_id = %user_id, "Role version bumped during lookup, not caching");
            return Ok(snapshot);
        }
        entry.cached = Some((snapshot.clone(), Instant::now()));
        debug!(cache.version = snapshot.version, "Role cache filled");
        self.evict_expired(&mut entries);

        Ok(snapshot)
    }

    #[instrument(skip(self), fields(cache.backend = "memory"))]
    async fn bump(&self, user_id: &str) -> Result<u64, CacheError> {
        let mut entries = self.entries.write();
        let entry = entries.entry(user_id.to_string()).or_default();
        let seen = entry
            .cached
            .as_ref()
            .map(|(snapshot, _)| snapshot.version)
            .unwrap_or(0);

        entry.floor = entry.floor.max(seen) + 1;
        entry.cached = None;
        debug!(cache.version = entry.floor, "Role version bumped");

        Ok(entry.floor)
    }
}
