//! The assembled authorization engine.
//!
//! One owned façade over the decision point, the scope resolver, the
//! matrix write path, and the shared permission cache. Construction is
//! explicit dependency injection: callers hand in stores and a config and
//! hold the engine wherever they keep application state. There is no
//! process-global instance to reach for.

use std::collections::HashSet;
use std::sync::Arc;

use gridmon_core::{ClientId, ClientScope, DashboardName, Principal, RoleName};
use sqlx::PgPool;

use crate::cache::PermissionCache;
use crate::config::AuthorizationConfig;
use crate::decision::AccessDecisionPoint;
use crate::error::Result;
use crate::matrix::PermissionMatrixService;
use crate::resolver::ClientScopeResolver;
use crate::store::{
    HierarchyStore, PermissionStore, PgHierarchyStore, PgPermissionStore,
};
use crate::types::{AccessDecision, Capability};

/// RBAC decisions and client-data scoping behind one injected façade.
pub struct AuthorizationEngine {
    decisions: AccessDecisionPoint,
    resolver: ClientScopeResolver,
    matrix: PermissionMatrixService,
    cache: Arc<PermissionCache>,
}

impl AuthorizationEngine {
    /// Assemble an engine from storage ports and configuration.
    pub fn new(
        store: Arc<dyn PermissionStore>,
        hierarchy: Arc<dyn HierarchyStore>,
        config: AuthorizationConfig,
    ) -> Self {
        let cache = Arc::new(PermissionCache::new(config.cache_ttl()));
        Self {
            decisions: AccessDecisionPoint::new(Arc::clone(&store), Arc::clone(&cache)),
            resolver: ClientScopeResolver::with_max_depth(
                Arc::clone(&store),
                hierarchy,
                config.max_hierarchy_depth,
            ),
            matrix: PermissionMatrixService::new(store, Arc::clone(&cache)),
            cache,
        }
    }

    /// Assemble an engine backed by the gridmon database.
    pub fn from_pool(pool: PgPool, config: AuthorizationConfig) -> Self {
        Self::new(
            Arc::new(PgPermissionStore::new(pool.clone())),
            Arc::new(PgHierarchyStore::new(pool)),
            config,
        )
    }

    /// Full access decision with reason and source attribution.
    pub async fn check(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
        capability: Capability,
    ) -> Result<AccessDecision> {
        self.decisions.check(role, dashboard, capability).await
    }

    /// Whether the role may perform `capability` on `dashboard`.
    pub async fn has_capability(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
        capability: Capability,
    ) -> Result<bool> {
        self.decisions.has_capability(role, dashboard, capability).await
    }

    /// Whether the role may open `dashboard` at all.
    pub async fn has_dashboard_access(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
    ) -> Result<bool> {
        self.decisions.has_dashboard_access(role, dashboard).await
    }

    /// The client scope for `principal`.
    pub async fn resolve_scope(&self, principal: &Principal) -> Result<ClientScope> {
        self.resolver.resolve_scope(principal).await
    }

    /// The materialized set of client ids visible to `principal`.
    pub async fn accessible_client_ids(&self, principal: &Principal) -> Result<HashSet<ClientId>> {
        self.resolver.accessible_client_ids(principal).await
    }

    /// The permission matrix write path.
    #[must_use]
    pub fn matrix(&self) -> &PermissionMatrixService {
        &self.matrix
    }

    /// Drop one role's cached permissions. For writers that bypass
    /// [`Self::matrix`], called after the write lands and before success
    /// is reported.
    pub fn invalidate_role(&self, role: &RoleName) {
        self.cache.invalidate_role(role);
    }

    /// Drop every cached permission set.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
