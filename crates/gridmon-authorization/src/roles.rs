//! Role registry: system roles, custom roles, and scope classification.
//!
//! The four system roles are a closed enum with fixed ranks. Custom roles
//! are open-ended registry rows; the two meet in [`RoleDescriptor`], the
//! uniform view every scope computation works from. There is exactly one
//! definition of the admin bypass ([`is_admin_role`]) and exactly one
//! derivation of a role's scope class ([`RoleDescriptor::scope_class`]);
//! nothing else in the engine compares role names.

use gridmon_core::RoleName;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The roles seeded at install time, in ascending rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    /// Read-only dashboard user, rank 10.
    Viewer,
    /// Day-to-day dashboard user, rank 20.
    User,
    /// Administers a client subtree, rank 30.
    BranchAdmin,
    /// The single top-rank role, exempt from all checks, rank 40.
    Admin,
}

impl SystemRole {
    /// All system roles, ascending by rank.
    pub const ALL: [SystemRole; 4] = [
        SystemRole::Viewer,
        SystemRole::User,
        SystemRole::BranchAdmin,
        SystemRole::Admin,
    ];

    /// Canonical registry name. Matching is exact and case-sensitive.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SystemRole::Viewer => "viewer",
            SystemRole::User => "user",
            SystemRole::BranchAdmin => "branch_admin",
            SystemRole::Admin => "admin",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            SystemRole::Viewer => "Viewer",
            SystemRole::User => "Standard User",
            SystemRole::BranchAdmin => "Branch Admin",
            SystemRole::Admin => "Administrator",
        }
    }

    /// Position in the authority ordering. Higher means broader authority.
    #[must_use]
    pub fn rank(&self) -> i32 {
        match self {
            SystemRole::Viewer => 10,
            SystemRole::User => 20,
            SystemRole::BranchAdmin => 30,
            SystemRole::Admin => 40,
        }
    }

    /// Whether holders administer a client subtree rather than one node.
    #[must_use]
    pub fn manages_hierarchy(&self) -> bool {
        matches!(self, SystemRole::BranchAdmin | SystemRole::Admin)
    }

    /// Look up a system role by its exact canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        SystemRole::ALL.into_iter().find(|role| role.name() == name)
    }
}

impl Display for SystemRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The one place that decides whether a role name is exempt from permission
/// and scope checks. Every bypass branch in the engine routes through here.
#[must_use]
pub fn is_admin_role(name: &str) -> bool {
    SystemRole::from_name(name) == Some(SystemRole::Admin)
}

/// How a role is scoped against the client hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeClass {
    /// Universal visibility; never restricted by client.
    Admin,
    /// Sees the closed subtree rooted at the assigned client.
    BranchAdmin,
    /// Sees exactly the assigned client, nothing below it.
    Regular,
}

/// Uniform view of a role's authority attributes.
///
/// System roles convert into this via `From<SystemRole>`; custom registry
/// rows via `From<&gridmon_db::Role>`. Anything else that can describe a
/// role (test fixtures, imported data) goes through [`RoleDescriptor::custom`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescriptor {
    /// Registry name of the role.
    pub name: RoleName,
    /// Position in the authority ordering.
    pub hierarchy_rank: i32,
    /// Whether this is one of the seeded system roles.
    pub is_system: bool,
    /// Whether holders administer a client subtree.
    pub manages_hierarchy: bool,
    /// Inactive roles deny everything and scope to nothing.
    pub is_active: bool,
}

impl RoleDescriptor {
    /// Descriptor for a custom role.
    #[must_use]
    pub fn custom(name: impl Into<RoleName>, hierarchy_rank: i32, manages_hierarchy: bool) -> Self {
        Self {
            name: name.into(),
            hierarchy_rank,
            is_system: false,
            manages_hierarchy,
            is_active: true,
        }
    }

    /// The role's scope class. This is the only derivation of it.
    ///
    /// The admin class is reserved for the designated system admin role; a
    /// custom role can never reach it, no matter its rank. Any other role
    /// carrying the manage-hierarchy capability is branch-admin class.
    #[must_use]
    pub fn scope_class(&self) -> ScopeClass {
        if is_admin_role(self.name.as_str()) {
            ScopeClass::Admin
        } else if self.manages_hierarchy {
            ScopeClass::BranchAdmin
        } else {
            ScopeClass::Regular
        }
    }
}

impl From<SystemRole> for RoleDescriptor {
    fn from(role: SystemRole) -> Self {
        Self {
            name: RoleName::from(role.name()),
            hierarchy_rank: role.rank(),
            is_system: true,
            manages_hierarchy: role.manages_hierarchy(),
            // System roles cannot be deactivated; the registry enforces it.
            is_active: true,
        }
    }
}

impl From<&gridmon_db::Role> for RoleDescriptor {
    fn from(row: &gridmon_db::Role) -> Self {
        Self {
            name: RoleName::from(row.name.as_str()),
            hierarchy_rank: row.hierarchy_rank,
            is_system: row.is_system_role,
            manages_hierarchy: row.can_manage_hierarchy,
            is_active: row.is_active,
        }
    }
}
