//! Permission matrix model.
//!
//! One row per (role, dashboard) pair carrying the three capability flags.
//! Absence of a row means no access; there is no row state that widens
//! access beyond its flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

/// A single permission matrix entry.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RolePermission {
    /// Role name, foreign key into the role registry.
    pub role_name: String,

    /// Dashboard name, foreign key into the dashboard registry.
    pub dashboard_name: String,

    /// Whether the role may view the dashboard. Gates the other two flags.
    pub can_access: bool,

    /// Whether the role may modify data surfaced on the dashboard.
    pub can_edit: bool,

    /// Whether the role may remove data surfaced on the dashboard.
    pub can_delete: bool,

    /// When this entry was last written.
    pub updated_at: DateTime<Utc>,
}

/// Flags to write for a (role, dashboard) pair.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PermissionFlags {
    pub can_access: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl RolePermission {
    /// Load the effective matrix row set for a role.
    ///
    /// Joins against the role and dashboard registries so that entries for
    /// inactive dashboards drop out and an inactive or unknown role loads as
    /// the empty set. Callers never have to re-check registry state.
    pub async fn list_for_role<'e, E>(
        executor: E,
        role_name: &str,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT rp.role_name, rp.dashboard_name, rp.can_access, rp.can_edit, rp.can_delete, rp.updated_at
            FROM role_permissions rp
            JOIN roles r ON r.name = rp.role_name AND r.is_active = TRUE
            JOIN dashboards d ON d.name = rp.dashboard_name AND d.is_active = TRUE
            WHERE rp.role_name = $1
            ORDER BY rp.dashboard_name
            ",
        )
        .bind(role_name)
        .fetch_all(executor)
        .await
    }

    /// List every entry granting access to a dashboard, for admin screens.
    pub async fn list_for_dashboard<'e, E>(
        executor: E,
        dashboard_name: &str,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM role_permissions
            WHERE dashboard_name = $1
            ORDER BY role_name
            ",
        )
        .bind(dashboard_name)
        .fetch_all(executor)
        .await
    }

    /// Insert or overwrite the entry for a (role, dashboard) pair.
    pub async fn upsert<'e, E>(
        executor: E,
        role_name: &str,
        dashboard_name: &str,
        flags: PermissionFlags,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO role_permissions (role_name, dashboard_name, can_access, can_edit, can_delete)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (role_name, dashboard_name)
            DO UPDATE SET can_access = $3, can_edit = $4, can_delete = $5, updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(role_name)
        .bind(dashboard_name)
        .bind(flags.can_access)
        .bind(flags.can_edit)
        .bind(flags.can_delete)
        .fetch_one(executor)
        .await
    }

    /// Remove the entry for a (role, dashboard) pair. Removal means deny.
    pub async fn delete<'e, E>(
        executor: E,
        role_name: &str,
        dashboard_name: &str,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            DELETE FROM role_permissions
            WHERE role_name = $1 AND dashboard_name = $2
            ",
        )
        .bind(role_name)
        .bind(dashboard_name)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every entry for a role, e.g. when the role is retired.
    pub async fn delete_all_for_role<'e, E>(
        executor: E,
        role_name: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            DELETE FROM role_permissions
            WHERE role_name = $1
            ",
        )
        .bind(role_name)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
