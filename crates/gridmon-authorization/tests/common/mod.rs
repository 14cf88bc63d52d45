//! Test helpers for gridmon-authorization integration tests.
//!
//! Builds a fully wired [`AuthorizationEngine`] over the in-memory stores,
//! with the four system roles pre-registered the way the production seed
//! data registers them, plus builders for client-tree fixtures.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Once;

use chrono::Utc;
use uuid::Uuid;

use gridmon_authorization::{
    AuthorizationConfig, AuthorizationEngine, HierarchyStore, InMemoryHierarchyStore,
    InMemoryPermissionStore, PermissionGrant, PermissionStore, SystemRole,
};
use gridmon_core::{DashboardName, RoleName};
use gridmon_db::{ClientNode, ClientType};

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// An engine wired over in-memory stores, with handles kept so tests can
/// reach behind the façade: count storage loads, write without
/// invalidating, or break the stores on purpose.
pub struct TestContext {
    pub engine: AuthorizationEngine,
    pub permissions: Arc<InMemoryPermissionStore>,
    pub hierarchy: Arc<InMemoryHierarchyStore>,
}

impl TestContext {
    /// Engine with default configuration and the system roles registered.
    pub async fn new() -> Self {
        Self::with_config(AuthorizationConfig::default()).await
    }

    /// Engine with explicit configuration.
    pub async fn with_config(config: AuthorizationConfig) -> Self {
        init_test_logging();

        let permissions = Arc::new(InMemoryPermissionStore::new());
        for role in SystemRole::ALL {
            permissions.insert_role(role.into()).await;
        }
        let hierarchy = Arc::new(InMemoryHierarchyStore::new());

        let engine = AuthorizationEngine::new(
            Arc::clone(&permissions) as Arc<dyn PermissionStore>,
            Arc::clone(&hierarchy) as Arc<dyn HierarchyStore>,
            config,
        );
        Self {
            engine,
            permissions,
            hierarchy,
        }
    }

    /// Insert the tree root and return it.
    pub async fn seed_root(&self) -> ClientNode {
        let root = make_root("GenVolt");
        self.hierarchy.insert_node(root.clone()).await;
        root
    }

    /// Insert a child under `parent` and return it.
    pub async fn add_child(&self, parent: &ClientNode, client_type: ClientType) -> ClientNode {
        let child = make_child(parent, client_type);
        self.hierarchy.insert_node(child.clone()).await;
        child
    }

    /// Grant through the engine's matrix write path (storage write plus
    /// cache eviction, exactly as the admin surface does it).
    pub async fn grant(&self, role: &str, dashboard: &str, grant: PermissionGrant) {
        self.engine
            .matrix()
            .grant(&RoleName::from(role), &DashboardName::from(dashboard), grant)
            .await
            .expect("grant should succeed against the in-memory store");
    }
}

/// A root node with level 0 and a single-element ancestor path.
pub fn make_root(display_name: &str) -> ClientNode {
    let id = Uuid::new_v4();
    ClientNode {
        id,
        display_name: display_name.to_string(),
        parent_id: None,
        hierarchy_level: 0,
        hierarchy_path: vec![id],
        client_type: ClientType::Root,
        is_leaf_node: false,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A child node whose level and path extend its parent's.
pub fn make_child(parent: &ClientNode, client_type: ClientType) -> ClientNode {
    let id = Uuid::new_v4();
    let mut path = parent.hierarchy_path.clone();
    path.push(id);
    ClientNode {
        id,
        display_name: format!("{}-{}", parent.display_name, &id.simple().to_string()[..6]),
        parent_id: Some(parent.id),
        hierarchy_level: parent.hierarchy_level + 1,
        hierarchy_path: path,
        client_type,
        is_leaf_node: matches!(client_type, ClientType::Site | ClientType::Client),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
