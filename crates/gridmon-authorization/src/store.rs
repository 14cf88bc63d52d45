//! Storage ports for the authorization engine.
//!
//! [`PermissionStore`] covers the role registry and the permission matrix;
//! [`HierarchyStore`] supplies the client-tree snapshot. The engine only
//! ever talks to these traits, so tests run against the in-memory
//! implementations and production wires in the PostgreSQL ones.

use async_trait::async_trait;
use gridmon_core::{DashboardName, RoleName};
use gridmon_db::{ClientNode, PermissionFlags, Role, RolePermission};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::roles::RoleDescriptor;
use crate::types::{PermissionGrant, PermissionSet};

/// Read/write access to the role registry and permission matrix.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Look up a role descriptor by exact name. Unknown names are `None`.
    async fn load_role(&self, role: &RoleName) -> Result<Option<RoleDescriptor>>;

    /// Load the effective permission set for a role: its matrix rows joined
    /// against active dashboards. An unknown or inactive role loads as the
    /// empty set, never as an error.
    async fn load_permissions(&self, role: &RoleName) -> Result<PermissionSet>;

    /// Insert or overwrite one matrix entry.
    async fn upsert_permission(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
        grant: PermissionGrant,
    ) -> Result<()>;

    /// Remove one matrix entry. Returns whether an entry existed.
    async fn remove_permission(&self, role: &RoleName, dashboard: &DashboardName) -> Result<bool>;

    /// Remove every matrix entry for a role. Returns how many were removed.
    async fn remove_all_permissions(&self, role: &RoleName) -> Result<u64>;
}

/// Read access to the client-tree snapshot.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// Load every client node, active and inactive, in one query. The
    /// resolver validates the snapshot before using it.
    async fn load_nodes(&self) -> Result<Vec<ClientNode>>;
}

// ============================================================================
// PostgreSQL implementations
// ============================================================================

/// Permission store backed by the gridmon database.
#[derive(Clone)]
pub struct PgPermissionStore {
    pool: PgPool,
}

impl PgPermissionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    async fn load_role(&self, role: &RoleName) -> Result<Option<RoleDescriptor>> {
        let row = Role::find_by_name(&self.pool, role.as_str()).await?;
        Ok(row.as_ref().map(RoleDescriptor::from))
    }

    async fn load_permissions(&self, role: &RoleName) -> Result<PermissionSet> {
        let rows = RolePermission::list_for_role(&self.pool, role.as_str()).await?;
        Ok(PermissionSet::from_rows(&rows))
    }

    async fn upsert_permission(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
        grant: PermissionGrant,
    ) -> Result<()> {
        RolePermission::upsert(
            &self.pool,
            role.as_str(),
            dashboard.as_str(),
            PermissionFlags {
                can_access: grant.can_access,
                can_edit: grant.can_edit,
                can_delete: grant.can_delete,
            },
        )
        .await?;
        Ok(())
    }

    async fn remove_permission(&self, role: &RoleName, dashboard: &DashboardName) -> Result<bool> {
        Ok(RolePermission::delete(&self.pool, role.as_str(), dashboard.as_str()).await?)
    }

    async fn remove_all_permissions(&self, role: &RoleName) -> Result<u64> {
        Ok(RolePermission::delete_all_for_role(&self.pool, role.as_str()).await?)
    }
}

/// Hierarchy store backed by the gridmon database.
#[derive(Clone)]
pub struct PgHierarchyStore {
    pool: PgPool,
}

impl PgHierarchyStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HierarchyStore for PgHierarchyStore {
    async fn load_nodes(&self) -> Result<Vec<ClientNode>> {
        Ok(ClientNode::list_all(&self.pool).await?)
    }
}

// ============================================================================
// In-memory implementations for testing
// ============================================================================

/// In-memory permission store.
///
/// Tracks how many times permissions were loaded so cache tests can assert
/// round-trip counts, and can be switched into a failing state to exercise
/// the storage-unavailable path.
#[derive(Default)]
pub struct InMemoryPermissionStore {
    roles: RwLock<HashMap<RoleName, RoleDescriptor>>,
    grants: RwLock<HashMap<RoleName, HashMap<DashboardName, PermissionGrant>>>,
    load_count: AtomicUsize,
    fail_loads: AtomicBool,
}

impl InMemoryPermissionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a role descriptor.
    pub async fn insert_role(&self, descriptor: RoleDescriptor) {
        let mut roles = self.roles.write().await;
        roles.insert(descriptor.name.clone(), descriptor);
    }

    /// Mark a registered role active or inactive.
    pub async fn set_role_active(&self, role: &RoleName, active: bool) {
        let mut roles = self.roles.write().await;
        if let Some(descriptor) = roles.get_mut(role) {
            descriptor.is_active = active;
        }
    }

    /// Number of `load_permissions` calls that reached this store.
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    /// When set, every load fails with a pool-closed error, simulating an
    /// unavailable database.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed.into());
        }
        Ok(())
    }

    async fn role_is_active(&self, role: &RoleName) -> bool {
        let roles = self.roles.read().await;
        roles.get(role).is_some_and(|descriptor| descriptor.is_active)
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn load_role(&self, role: &RoleName) -> Result<Option<RoleDescriptor>> {
        self.check_available()?;
        let roles = self.roles.read().await;
        Ok(roles.get(role).cloned())
    }

    async fn load_permissions(&self, role: &RoleName) -> Result<PermissionSet> {
        self.check_available()?;
        self.load_count.fetch_add(1, Ordering::SeqCst);

        // Mirror the SQL join: an unknown or inactive role loads empty.
        if !self.role_is_active(role).await {
            return Ok(PermissionSet::empty());
        }

        let grants = self.grants.read().await;
        let mut set = PermissionSet::empty();
        if let Some(entries) = grants.get(role) {
            for (dashboard, grant) in entries {
                set.insert(dashboard.clone(), *grant);
            }
        }
        Ok(set)
    }

    async fn upsert_permission(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
        grant: PermissionGrant,
    ) -> Result<()> {
        self.check_available()?;
        let mut grants = self.grants.write().await;
        grants
            .entry(role.clone())
            .or_default()
            .insert(dashboard.clone(), grant);
        Ok(())
    }

    async fn remove_permission(&self, role: &RoleName, dashboard: &DashboardName) -> Result<bool> {
        self.check_available()?;
        let mut grants = self.grants.write().await;
        Ok(grants
            .get_mut(role)
            .is_some_and(|entries| entries.remove(dashboard).is_some()))
    }

    async fn remove_all_permissions(&self, role: &RoleName) -> Result<u64> {
        self.check_available()?;
        let mut grants = self.grants.write().await;
        Ok(grants
            .remove(role)
            .map_or(0, |entries| entries.len() as u64))
    }
}

/// In-memory hierarchy store with the same failure switch as
/// [`InMemoryPermissionStore`].
#[derive(Default)]
pub struct InMemoryHierarchyStore {
    nodes: RwLock<Vec<ClientNode>>,
    load_count: AtomicUsize,
    fail_loads: AtomicBool,
}

impl InMemoryHierarchyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the snapshot.
    pub async fn insert_node(&self, node: ClientNode) {
        let mut nodes = self.nodes.write().await;
        nodes.push(node);
    }

    /// Flip a node's active flag.
    pub async fn set_node_active(&self, id: uuid::Uuid, active: bool) {
        let mut nodes = self.nodes.write().await;
        for node in nodes.iter_mut() {
            if node.id == id {
                node.is_active = active;
            }
        }
    }

    /// Number of `load_nodes` calls that reached this store.
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    /// When set, every load fails with a pool-closed error.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl HierarchyStore for InMemoryHierarchyStore {
    async fn load_nodes(&self) -> Result<Vec<ClientNode>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed.into());
        }
        self.load_count.fetch_add(1, Ordering::SeqCst);
        let nodes = self.nodes.read().await;
        Ok(nodes.clone())
    }
}
