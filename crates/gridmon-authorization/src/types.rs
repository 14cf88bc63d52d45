//! Decision types for the authorization engine.
//!
//! [`PermissionSet`] is the resolved, cacheable view of one role's row set
//! in the permission matrix. [`AccessDecision`] is what the decision point
//! hands back: the boolean plus where it came from, so callers and audit
//! logs can distinguish an admin bypass from a matrix grant from a default
//! deny.

use gridmon_core::{DashboardName, RoleName};
use gridmon_db::RolePermission;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// The three capabilities a matrix entry can grant on a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// May view the dashboard at all. Gates the other two.
    Access,
    /// May modify data surfaced on the dashboard.
    Edit,
    /// May remove data surfaced on the dashboard.
    Delete,
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Capability::Access => "access",
            Capability::Edit => "edit",
            Capability::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

/// The capability flags granted by one matrix entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub can_access: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl PermissionGrant {
    /// Grant that allows viewing only.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            can_access: true,
            can_edit: false,
            can_delete: false,
        }
    }

    /// Grant that allows all three capabilities.
    #[must_use]
    pub fn full() -> Self {
        Self {
            can_access: true,
            can_edit: true,
            can_delete: true,
        }
    }

    /// Whether this grant allows `capability`.
    ///
    /// `can_access` is the gating flag: when it is false the entry denies
    /// every capability, even if `can_edit` or `can_delete` were written
    /// true by a careless admin edit.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        if !self.can_access {
            return false;
        }
        match capability {
            Capability::Access => true,
            Capability::Edit => self.can_edit,
            Capability::Delete => self.can_delete,
        }
    }
}

impl From<&RolePermission> for PermissionGrant {
    fn from(row: &RolePermission) -> Self {
        Self {
            can_access: row.can_access,
            can_edit: row.can_edit,
            can_delete: row.can_delete,
        }
    }
}

/// One role's resolved permission matrix rows, keyed by dashboard.
///
/// This is the unit the permission cache stores. An unknown or inactive
/// role resolves to an empty set, which denies everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    entries: HashMap<DashboardName, PermissionGrant>,
}

impl PermissionSet {
    /// An empty set: denies every dashboard.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from the matrix rows loaded for one role.
    #[must_use]
    pub fn from_rows(rows: &[RolePermission]) -> Self {
        let entries = rows
            .iter()
            .map(|row| (DashboardName::from(row.dashboard_name.as_str()), PermissionGrant::from(row)))
            .collect();
        Self { entries }
    }

    /// Insert or replace the grant for a dashboard.
    pub fn insert(&mut self, dashboard: DashboardName, grant: PermissionGrant) {
        self.entries.insert(dashboard, grant);
    }

    /// The grant for a dashboard, if an entry exists.
    #[must_use]
    pub fn grant_for(&self, dashboard: &DashboardName) -> Option<&PermissionGrant> {
        self.entries.get(dashboard)
    }

    /// Whether this set allows `capability` on `dashboard`.
    ///
    /// A missing entry is an explicit deny; there is no inheritance across
    /// dashboards and no name-prefix matching.
    #[must_use]
    pub fn allows(&self, dashboard: &DashboardName, capability: Capability) -> bool {
        self.entries
            .get(dashboard)
            .is_some_and(|grant| grant.allows(capability))
    }

    /// Number of dashboards with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no dashboard has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> impl Iterator<Item = (&DashboardName, &PermissionGrant)> {
        self.entries.iter()
    }
}

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The designated admin role; exempt from the matrix entirely.
    AdminBypass,
    /// A matrix entry existed and its flags decided the outcome.
    Matrix,
    /// No matrix entry for the (role, dashboard) pair.
    DefaultDeny,
}

/// The outcome of one dashboard-capability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether the capability is granted.
    pub allowed: bool,
    /// Human-readable explanation for logs and audit trails.
    pub reason: String,
    /// Where the decision came from.
    pub source: DecisionSource,
    /// The role the check was made for.
    pub role: RoleName,
    /// The dashboard the check was made against.
    pub dashboard: DashboardName,
    /// The capability that was checked.
    pub capability: Capability,
}
