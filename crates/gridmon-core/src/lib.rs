//! gridmon Core Library
//!
//! Shared types for the gridmon platform.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`ClientId`, `UserId`, `DeviceId`)
//! - [`names`] - Role and dashboard name keys
//! - [`principal`] - The authenticated subject handed over by the auth layer
//! - [`scope`] - Client visibility scopes applied to data fetches
//!
//! # Example
//!
//! ```
//! use gridmon_core::{ClientId, Principal, RoleName};
//!
//! let client = ClientId::new();
//! let principal = Principal::new(
//!     gridmon_core::UserId::new(),
//!     RoleName::from("viewer"),
//!     client,
//! );
//! assert_eq!(principal.assigned_client_id, Some(client));
//! ```

pub mod ids;
pub mod names;
pub mod principal;
pub mod scope;

// Re-export main types for convenient access
pub use ids::{ClientId, DeviceId, ParseIdError, UserId};
pub use names::{DashboardName, RoleName};
pub use principal::Principal;
pub use scope::ClientScope;
