//! Role registry model.
//!
//! Roles are keyed by their exact, case-sensitive name. Each role carries a
//! hierarchy rank (higher = broader authority) used for display ordering and
//! for classifying hierarchy-management roles. System roles are seeded at
//! install time and cannot be renamed, deactivated, or deleted through this
//! model; the guard lives in the WHERE clause of every mutating query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

/// A role as stored in the registry.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Role {
    /// Unique, case-sensitive role name. Primary key of the registry and
    /// the key the permission matrix joins on.
    pub name: String,

    /// Human-readable label shown in admin screens.
    pub display_name: String,

    /// Optional free-form description.
    pub description: Option<String>,

    /// Position in the authority ordering. Higher means broader authority.
    /// Ranks are unique across the registry (UNIQUE index).
    pub hierarchy_rank: i32,

    /// Whether this role was seeded at install time. System roles are
    /// immutable through this model.
    pub is_system_role: bool,

    /// Whether holders of this role administer a subtree of the client
    /// hierarchy rather than a single node.
    pub can_manage_hierarchy: bool,

    /// Inactive roles resolve to an empty permission set everywhere.
    pub is_active: bool,

    /// When the role was created.
    pub created_at: DateTime<Utc>,

    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Request to create a custom role.
///
/// Created roles are never system roles; that flag is set only by seed data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub hierarchy_rank: i32,
    #[serde(default)]
    pub can_manage_hierarchy: bool,
}

/// Request to update a custom role. System roles are not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRole {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub hierarchy_rank: Option<i32>,
    pub can_manage_hierarchy: Option<bool>,
}

impl Role {
    /// Find a role by its exact name.
    pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM roles
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(executor)
        .await
    }

    /// List active roles ordered by descending authority.
    pub async fn list_active<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM roles
            WHERE is_active = TRUE
            ORDER BY hierarchy_rank DESC
            ",
        )
        .fetch_all(executor)
        .await
    }

    /// List every role, active or not, for admin screens.
    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM roles
            ORDER BY hierarchy_rank DESC
            ",
        )
        .fetch_all(executor)
        .await
    }

    /// Create a custom role. Duplicate names or ranks surface as unique
    /// constraint violations.
    pub async fn create<'e, E>(executor: E, input: CreateRole) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO roles (name, display_name, description, hierarchy_rank, is_system_role, can_manage_hierarchy)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            RETURNING *
            ",
        )
        .bind(&input.name)
        .bind(&input.display_name)
        .bind(&input.description)
        .bind(input.hierarchy_rank)
        .bind(input.can_manage_hierarchy)
        .fetch_one(executor)
        .await
    }

    /// Update a custom role. Returns `None` when the role does not exist or
    /// is a system role.
    pub async fn update<'e, E>(
        executor: E,
        name: &str,
        input: UpdateRole,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut updates = vec!["updated_at = NOW()".to_string()];
        let mut param_idx = 2;

        if input.display_name.is_some() {
            updates.push(format!("display_name = ${param_idx}"));
            param_idx += 1;
        }
        if input.description.is_some() {
            updates.push(format!("description = ${param_idx}"));
            param_idx += 1;
        }
        if input.hierarchy_rank.is_some() {
            updates.push(format!("hierarchy_rank = ${param_idx}"));
            param_idx += 1;
        }
        if input.can_manage_hierarchy.is_some() {
            updates.push(format!("can_manage_hierarchy = ${param_idx}"));
        }

        let query = format!(
            "UPDATE roles SET {} WHERE name = $1 AND is_system_role = FALSE RETURNING *",
            updates.join(", ")
        );

        let mut q = sqlx::query_as::<_, Role>(&query).bind(name);

        if let Some(ref display_name) = input.display_name {
            q = q.bind(display_name);
        }
        if let Some(ref description) = input.description {
            q = q.bind(description);
        }
        if let Some(rank) = input.hierarchy_rank {
            q = q.bind(rank);
        }
        if let Some(manage) = input.can_manage_hierarchy {
            q = q.bind(manage);
        }

        q.fetch_optional(executor).await
    }

    /// Activate or deactivate a custom role. Returns `None` when the role
    /// does not exist or is a system role.
    pub async fn set_active<'e, E>(
        executor: E,
        name: &str,
        active: bool,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            UPDATE roles
            SET is_active = $2, updated_at = NOW()
            WHERE name = $1 AND is_system_role = FALSE
            RETURNING *
            ",
        )
        .bind(name)
        .bind(active)
        .fetch_optional(executor)
        .await
    }

    /// Delete a custom role. System roles are never deleted; returns `false`
    /// for them as for unknown names.
    pub async fn delete<'e, E>(executor: E, name: &str) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            DELETE FROM roles
            WHERE name = $1 AND is_system_role = FALSE
            ",
        )
        .bind(name)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
