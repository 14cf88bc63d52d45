//! Access decision point: the single place yes/no dashboard questions
//! are answered.
//!
//! Evaluation order:
//! 1. Admin bypass: the admin role is allowed everything, no matrix read
//! 2. Load the role's permission set through the TTL cache
//! 3. Exact-match lookup in the permission matrix
//! 4. Default deny when no entry exists
//!
//! Unknown roles, deactivated roles, and absent matrix entries are all
//! ordinary denials, not errors. Only a storage failure while loading
//! permissions surfaces as `Err`, and the caller fails the request
//! rather than guessing.

use std::sync::Arc;

use gridmon_core::{DashboardName, RoleName};

use crate::cache::PermissionCache;
use crate::error::Result;
use crate::roles::is_admin_role;
use crate::store::PermissionStore;
use crate::types::{AccessDecision, Capability, DecisionSource};

/// Evaluates "can role R do C on dashboard D?".
pub struct AccessDecisionPoint {
    store: Arc<dyn PermissionStore>,
    cache: Arc<PermissionCache>,
}

impl AccessDecisionPoint {
    /// Create a decision point over the given store and cache.
    pub fn new(store: Arc<dyn PermissionStore>, cache: Arc<PermissionCache>) -> Self {
        Self { store, cache }
    }

    /// Full decision with reason and source attribution.
    pub async fn check(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
        capability: Capability,
    ) -> Result<AccessDecision> {
        // Step 1: admin bypass. This is the only place the shortcut lives;
        // every admin capability flows through this branch.
        if is_admin_role(role.as_str()) {
            let decision = AccessDecision {
                allowed: true,
                reason: "admin role bypasses the permission matrix".to_string(),
                source: DecisionSource::AdminBypass,
                role: role.clone(),
                dashboard: dashboard.clone(),
                capability,
            };
            self.log_decision(&decision);
            return Ok(decision);
        }

        // Step 2: resolve the role's permission set through the cache.
        let permissions = self.cache.get_or_load(self.store.as_ref(), role).await?;

        // Steps 3 and 4: exact matrix lookup, default deny on absence.
        let decision = match permissions.grant_for(dashboard) {
            Some(grant) => {
                let allowed = grant.allows(capability);
                AccessDecision {
                    allowed,
                    reason: format!(
                        "{} by permission matrix",
                        if allowed { "granted" } else { "denied" }
                    ),
                    source: DecisionSource::Matrix,
                    role: role.clone(),
                    dashboard: dashboard.clone(),
                    capability,
                }
            }
            None => AccessDecision {
                allowed: false,
                reason: "no permission matrix entry".to_string(),
                source: DecisionSource::DefaultDeny,
                role: role.clone(),
                dashboard: dashboard.clone(),
                capability,
            },
        };

        self.log_decision(&decision);
        Ok(decision)
    }

    /// Whether the role may perform `capability` on `dashboard`.
    pub async fn has_capability(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
        capability: Capability,
    ) -> Result<bool> {
        Ok(self.check(role, dashboard, capability).await?.allowed)
    }

    /// Whether the role may open `dashboard` at all.
    pub async fn has_dashboard_access(
        &self,
        role: &RoleName,
        dashboard: &DashboardName,
    ) -> Result<bool> {
        self.has_capability(role, dashboard, Capability::Access).await
    }

    fn log_decision(&self, decision: &AccessDecision) {
        tracing::debug!(
            target: "authorization",
            role = %decision.role,
            dashboard = %decision.dashboard,
            capability = %decision.capability,
            allowed = decision.allowed,
            source = ?decision.source,
            "access decision"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::SystemRole;
    use crate::store::InMemoryPermissionStore;
    use crate::types::PermissionGrant;

    fn names(role: &str, dashboard: &str) -> (RoleName, DashboardName) {
        (RoleName::from(role), DashboardName::from(dashboard))
    }

    async fn seeded_store() -> Arc<InMemoryPermissionStore> {
        let store = InMemoryPermissionStore::new();
        store.insert_role(SystemRole::Viewer.into()).await;
        store
            .upsert_permission(
                &RoleName::from("viewer"),
                &DashboardName::from("iot_dashboard"),
                PermissionGrant::read_only(),
            )
            .await
            .unwrap();
        Arc::new(store)
    }

    fn decision_point(store: Arc<InMemoryPermissionStore>) -> AccessDecisionPoint {
        AccessDecisionPoint::new(store, Arc::new(PermissionCache::default()))
    }

    #[tokio::test]
    async fn test_admin_allowed_without_matrix_rows() {
        let store = seeded_store().await;
        let pdp = decision_point(Arc::clone(&store));
        let (admin, motor) = names("admin", "motor_dashboard");

        let decision = pdp.check(&admin, &motor, Capability::Delete).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.source, DecisionSource::AdminBypass);
        // The bypass never touches storage.
        assert_eq!(store.load_count(), 0);
    }

    #[tokio::test]
    async fn test_matrix_grant_allows_access_only() {
        let store = seeded_store().await;
        let pdp = decision_point(store);
        let (viewer, iot) = names("viewer", "iot_dashboard");

        assert!(pdp.has_dashboard_access(&viewer, &iot).await.unwrap());
        assert!(!pdp.has_capability(&viewer, &iot, Capability::Edit).await.unwrap());
        assert!(!pdp.has_capability(&viewer, &iot, Capability::Delete).await.unwrap());

        let decision = pdp.check(&viewer, &iot, Capability::Edit).await.unwrap();
        assert_eq!(decision.source, DecisionSource::Matrix);
        assert!(!decision.allowed);
    }

    #[tokio::test]
    async fn test_missing_entry_is_default_deny() {
        let store = seeded_store().await;
        let pdp = decision_point(store);
        let (viewer, motor) = names("viewer", "motor_dashboard");

        let decision = pdp.check(&viewer, &motor, Capability::Access).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.source, DecisionSource::DefaultDeny);
    }

    #[tokio::test]
    async fn test_revoked_access_gates_other_capabilities() {
        let store = seeded_store().await;
        store
            .upsert_permission(
                &RoleName::from("viewer"),
                &DashboardName::from("motor_dashboard"),
                PermissionGrant {
                    can_access: false,
                    can_edit: true,
                    can_delete: true,
                },
            )
            .await
            .unwrap();
        let pdp = decision_point(store);
        let (viewer, motor) = names("viewer", "motor_dashboard");

        // Edit and delete are meaningless without access.
        assert!(!pdp.has_capability(&viewer, &motor, Capability::Edit).await.unwrap());
        assert!(!pdp.has_capability(&viewer, &motor, Capability::Delete).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_role_denies_without_error() {
        let store = seeded_store().await;
        let pdp = decision_point(store);
        let (ghost, iot) = names("ghost", "iot_dashboard");

        let decision = pdp.check(&ghost, &iot, Capability::Access).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.source, DecisionSource::DefaultDeny);
    }

    #[tokio::test]
    async fn test_deactivated_role_denies_without_error() {
        let store = seeded_store().await;
        store.set_role_active(&RoleName::from("viewer"), false).await;
        let pdp = decision_point(store);
        let (viewer, iot) = names("viewer", "iot_dashboard");

        assert!(!pdp.has_dashboard_access(&viewer, &iot).await.unwrap());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let store = seeded_store().await;
        store.set_fail_loads(true);
        let pdp = decision_point(store);
        let (viewer, iot) = names("viewer", "iot_dashboard");

        assert!(pdp.check(&viewer, &iot, Capability::Access).await.is_err());
    }

    #[tokio::test]
    async fn test_admin_bypass_survives_storage_failure() {
        let store = seeded_store().await;
        store.set_fail_loads(true);
        let pdp = decision_point(store);
        let (admin, iot) = names("admin", "iot_dashboard");

        // The bypass takes no storage path, so the outage is invisible.
        assert!(pdp.has_dashboard_access(&admin, &iot).await.unwrap());
    }
}
