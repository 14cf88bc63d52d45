//! Role-based access control and hierarchical data isolation for gridmon.
//!
//! Answers the two questions every request pipeline asks:
//!
//! - may this role use this dashboard capability? (permission matrix,
//!   TTL-cached, admin bypass, default deny)
//! - which client-tree nodes may this principal see? (scope resolution
//!   over the stored ancestor paths)
//!
//! Everything here fails closed: unknown roles, missing matrix entries,
//! and malformed hierarchy data all resolve to deny or to an empty scope,
//! and storage failures surface as errors rather than permissive
//! fallbacks.

pub mod cache;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod matrix;
pub mod resolver;
pub mod roles;
pub mod store;
pub mod types;

pub use cache::{PermissionCache, PERMISSION_CACHE_TTL_SECS};
pub use config::{AuthorizationConfig, ConfigError};
pub use decision::AccessDecisionPoint;
pub use engine::AuthorizationEngine;
pub use error::AuthorizationError;
pub use hierarchy::{ClientHierarchy, HierarchyError, MAX_HIERARCHY_DEPTH};
pub use matrix::PermissionMatrixService;
pub use resolver::ClientScopeResolver;
pub use roles::{is_admin_role, RoleDescriptor, ScopeClass, SystemRole};
pub use store::{
    HierarchyStore, InMemoryHierarchyStore, InMemoryPermissionStore, PermissionStore,
    PgHierarchyStore, PgPermissionStore,
};
pub use types::*;
