//! Permission matrix management.
//!
//! The write path for the role/dashboard grant matrix. Every mutation
//! runs storage-first, then evicts the affected role from the permission
//! cache, and only then reports success. A caller that has been
//! acknowledged therefore never observes a later read served from the
//! pre-write cache entry.

use std::sync::Arc;

use gridmon_core::{DashboardName, RoleName};

use crate::cache::PermissionCache;
use crate::error::Result;
use crate::store::PermissionStore;
use crate::types::PermissionGrant;

/// Admin-facing mutations of the permission matrix.
pub struct PermissionMatrixService {
    store: Arc<dyn PermissionStore>,
    cache: Arc<PermissionCache>,
}

impl PermissionMatrixService {
    /// Create a matrix service writing through the given store and
    /// invalidating the given cache.
    pub fn new(store: Arc<dyn PermissionStore>, cache: Arc<PermissionCache>) -> Self {
        Self { store, cache }
    }

    /// Insert or overwrite the grant for `(role, dashboard)`.
    pub async fn grant(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
        grant: PermissionGrant,
    ) -> Result<()> {
        self.store.upsert_permission(role, dashboard, grant).await?;
        self.cache.invalidate_role(role);
        tracing::info!(
            target: "authorization",
            role = %role,
            dashboard = %dashboard,
            can_access = grant.can_access,
            can_edit = grant.can_edit,
            can_delete = grant.can_delete,
            "permission granted"
        );
        Ok(())
    }

    /// Remove the grant for `(role, dashboard)`. Returns whether an entry
    /// existed.
    pub async fn revoke(&self, role: &RoleName, dashboard: &DashboardName) -> Result<bool> {
        let removed = self.store.remove_permission(role, dashboard).await?;
        self.cache.invalidate_role(role);
        tracing::info!(
            target: "authorization",
            role = %role,
            dashboard = %dashboard,
            removed,
            "permission revoked"
        );
        Ok(removed)
    }

    /// Remove every grant a role holds, typically just before the role
    /// itself is deleted. Returns how many entries were removed.
    pub async fn revoke_all(&self, role: &RoleName) -> Result<u64> {
        let removed = self.store.remove_all_permissions(role).await?;
        self.cache.invalidate_role(role);
        tracing::info!(
            target: "authorization",
            role = %role,
            removed,
            "all permissions revoked"
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::SystemRole;
    use crate::store::InMemoryPermissionStore;
    use crate::types::Capability;

    struct Fixture {
        service: PermissionMatrixService,
        store: Arc<InMemoryPermissionStore>,
        cache: Arc<PermissionCache>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryPermissionStore::new());
        store.insert_role(SystemRole::Viewer.into()).await;
        let cache = Arc::new(PermissionCache::default());
        let service = PermissionMatrixService::new(
            Arc::clone(&store) as Arc<dyn PermissionStore>,
            Arc::clone(&cache),
        );
        Fixture {
            service,
            store,
            cache,
        }
    }

    #[tokio::test]
    async fn test_grant_is_visible_after_ack() {
        let fx = fixture().await;
        let role = RoleName::from("viewer");
        let dashboard = DashboardName::from("motor_dashboard");

        // Warm the cache with the pre-write state.
        let before = fx
            .cache
            .get_or_load(fx.store.as_ref(), &role)
            .await
            .unwrap();
        assert!(!before.allows(&dashboard, Capability::Access));

        fx.service
            .grant(&role, &dashboard, PermissionGrant::read_only())
            .await
            .unwrap();

        // The ack already evicted the stale entry.
        let after = fx
            .cache
            .get_or_load(fx.store.as_ref(), &role)
            .await
            .unwrap();
        assert!(after.allows(&dashboard, Capability::Access));
    }

    #[tokio::test]
    async fn test_grant_evicts_only_the_written_role() {
        let fx = fixture().await;
        fx.store.insert_role(SystemRole::User.into()).await;
        let viewer = RoleName::from("viewer");
        let user = RoleName::from("user");
        let dashboard = DashboardName::from("iot_dashboard");

        fx.cache.get_or_load(fx.store.as_ref(), &viewer).await.unwrap();
        fx.cache.get_or_load(fx.store.as_ref(), &user).await.unwrap();
        assert_eq!(fx.cache.len(), 2);

        fx.service
            .grant(&viewer, &dashboard, PermissionGrant::full())
            .await
            .unwrap();
        assert_eq!(fx.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_revoke_reports_whether_entry_existed() {
        let fx = fixture().await;
        let role = RoleName::from("viewer");
        let dashboard = DashboardName::from("iot_dashboard");

        fx.service
            .grant(&role, &dashboard, PermissionGrant::read_only())
            .await
            .unwrap();
        assert!(fx.service.revoke(&role, &dashboard).await.unwrap());
        assert!(!fx.service.revoke(&role, &dashboard).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_all_counts_removed_entries() {
        let fx = fixture().await;
        let role = RoleName::from("viewer");

        for dashboard in ["iot_dashboard", "motor_dashboard", "alarm_dashboard"] {
            fx.service
                .grant(&role, &DashboardName::from(dashboard), PermissionGrant::full())
                .await
                .unwrap();
        }

        assert_eq!(fx.service.revoke_all(&role).await.unwrap(), 3);
        let set = fx
            .cache
            .get_or_load(fx.store.as_ref(), &role)
            .await
            .unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let fx = fixture().await;
        let role = RoleName::from("viewer");
        let dashboard = DashboardName::from("iot_dashboard");

        fx.service
            .grant(&role, &dashboard, PermissionGrant::read_only())
            .await
            .unwrap();
        fx.cache.get_or_load(fx.store.as_ref(), &role).await.unwrap();
        assert_eq!(fx.cache.len(), 1);

        // A write that never reached storage must not evict what cached
        // readers are legitimately using.
        fx.store.set_fail_loads(true);
        assert!(fx
            .service
            .grant(&role, &dashboard, PermissionGrant::full())
            .await
            .is_err());
        assert_eq!(fx.cache.len(), 1);
    }
}
