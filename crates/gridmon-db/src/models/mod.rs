//! Database entity models for gridmon-db.
//!
//! These models represent the database tables and provide
//! type-safe interactions with PostgreSQL.

pub mod client_node;
pub mod dashboard;
pub mod device;
pub mod role;
pub mod role_permission;

pub use client_node::{ClientNode, ClientType, CreateClientNode};
pub use dashboard::{CreateDashboard, Dashboard};
pub use device::{CreateDevice, Device};
pub use role::{CreateRole, Role, UpdateRole};
pub use role_permission::{PermissionFlags, RolePermission};
