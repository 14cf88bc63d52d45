//! # gridmon-db
//!
//! Storage layer for the gridmon platform. Provides sqlx models and
//! parameterized queries for the role registry, the dashboard registry,
//! the permission matrix, the client hierarchy, and the device fleet.
//!
//! All SQL is parameterized (`$1`-style binds). Subtree membership uses the
//! stored `hierarchy_path uuid[]` column with array containment, never
//! recursive traversal. Client-scoped reads take a
//! [`ClientScope`](gridmon_core::ClientScope) so the isolation predicate is
//! part of the function signature.

pub mod error;
pub mod models;

pub use error::{DbError, DbResult};
pub use models::{
    ClientNode, ClientType, CreateClientNode, CreateDashboard, CreateDevice, CreateRole,
    Dashboard, Device, PermissionFlags, Role, RolePermission, UpdateRole,
};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Connect a PostgreSQL pool with the defaults the platform runs with.
pub async fn connect_pool(database_url: &str) -> DbResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(DbError::ConnectionFailed)
}
