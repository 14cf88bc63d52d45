//! Permission cache.
//!
//! Time-bounded memoization of resolved permission sets, keyed purely by
//! role name. A fresh entry is served without a storage round-trip; an
//! expired entry triggers a synchronous reload on the calling task. The
//! cache is an owned instance with no global state, so tests construct
//! isolated caches freely.
//!
//! Concurrency: concurrent misses for the same role race benignly; each
//! loads the same data and the last insert wins atomically per key. A
//! failed reload caches nothing and is never papered over with a stale
//! entry.

use dashmap::DashMap;
use gridmon_core::RoleName;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::store::PermissionStore;
use crate::types::PermissionSet;

/// Default time-to-live for cached permission sets.
pub const PERMISSION_CACHE_TTL_SECS: u64 = 300;

/// A cached permission set with its capture timestamp.
struct CachedPermissions {
    permissions: Arc<PermissionSet>,
    cached_at: Instant,
}

/// TTL cache of resolved permission sets, one entry per role.
pub struct PermissionCache {
    entries: DashMap<RoleName, CachedPermissions>,
    ttl: Duration,
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(PERMISSION_CACHE_TTL_SECS))
    }
}

impl PermissionCache {
    /// Create a cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The permission set for `role`: served from cache while fresh,
    /// otherwise reloaded from `store` and re-cached.
    ///
    /// A storage failure propagates to the caller and leaves no cache
    /// entry behind; the next call retries the load.
    pub async fn get_or_load(
        &self,
        store: &dyn PermissionStore,
        role: &RoleName,
    ) -> Result<Arc<PermissionSet>> {
        if let Some(cached) = self.entries.get(role) {
            if cached.cached_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.permissions));
            }
            // Expired; drop the guard before mutating the map.
            drop(cached);
            self.entries.remove(role);
        }

        let loaded = store.load_permissions(role).await?;
        let shared = Arc::new(loaded);

        self.entries.insert(
            role.clone(),
            CachedPermissions {
                permissions: Arc::clone(&shared),
                cached_at: Instant::now(),
            },
        );

        Ok(shared)
    }

    /// Evict one role's entry. The next read reloads from storage.
    pub fn invalidate_role(&self, role: &RoleName) {
        self.entries.remove(role);
    }

    /// Evict every entry. Used by writers that cannot scope their change
    /// to a single role.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Number of cached roles, fresh or expired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::SystemRole;
    use crate::store::InMemoryPermissionStore;
    use crate::types::{Capability, PermissionGrant};
    use gridmon_core::DashboardName;

    async fn store_with_viewer() -> InMemoryPermissionStore {
        let store = InMemoryPermissionStore::new();
        store.insert_role(SystemRole::Viewer.into()).await;
        store
            .upsert_permission(
                &RoleName::from("viewer"),
                &DashboardName::from("iot_dashboard"),
                PermissionGrant::read_only(),
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_storage() {
        let store = store_with_viewer().await;
        let cache = PermissionCache::new(Duration::from_secs(300));
        let role = RoleName::from("viewer");

        let first = cache.get_or_load(&store, &role).await.unwrap();
        let second = cache.get_or_load(&store, &role).await.unwrap();

        assert_eq!(store.load_count(), 1);
        // Same shared allocation, not just equal contents.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_expired_entry_reloads_synchronously() {
        let store = store_with_viewer().await;
        let cache = PermissionCache::new(Duration::from_millis(20));
        let role = RoleName::from("viewer");

        cache.get_or_load(&store, &role).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let reloaded = cache.get_or_load(&store, &role).await.unwrap();

        assert_eq!(store.load_count(), 2);
        assert!(reloaded.allows(&DashboardName::from("iot_dashboard"), Capability::Access));
    }

    #[tokio::test]
    async fn test_invalidate_role_forces_reload() {
        let store = store_with_viewer().await;
        let cache = PermissionCache::default();
        let role = RoleName::from("viewer");

        cache.get_or_load(&store, &role).await.unwrap();
        cache.invalidate_role(&role);
        cache.get_or_load(&store, &role).await.unwrap();

        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_every_role() {
        let store = store_with_viewer().await;
        store.insert_role(SystemRole::User.into()).await;
        let cache = PermissionCache::default();

        cache.get_or_load(&store, &RoleName::from("viewer")).await.unwrap();
        cache.get_or_load(&store, &RoleName::from("user")).await.unwrap();
        assert_eq!(cache.len(), 2);

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_caches_nothing() {
        let store = store_with_viewer().await;
        let cache = PermissionCache::default();
        let role = RoleName::from("viewer");

        store.set_fail_loads(true);
        assert!(cache.get_or_load(&store, &role).await.is_err());
        assert!(cache.is_empty());

        // Recovery: the next call loads fresh data.
        store.set_fail_loads(false);
        let set = cache.get_or_load(&store, &role).await.unwrap();
        assert!(set.allows(&DashboardName::from("iot_dashboard"), Capability::Access));
    }

    #[tokio::test]
    async fn test_concurrent_misses_converge() {
        let store = Arc::new(store_with_viewer().await);
        let cache = Arc::new(PermissionCache::default());
        let role = RoleName::from("viewer");

        let (a, b) = tokio::join!(
            cache.get_or_load(store.as_ref(), &role),
            cache.get_or_load(store.as_ref(), &role),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(*a, *b);
        assert_eq!(cache.len(), 1);
    }
}
