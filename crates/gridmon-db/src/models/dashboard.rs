//! Dashboard registry model.
//!
//! The protected resources of the platform. Each dashboard is keyed by an
//! exact, case-sensitive name; the permission matrix joins on that name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

/// A dashboard as stored in the registry.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Dashboard {
    /// Unique, case-sensitive dashboard name.
    pub name: String,

    /// Human-readable label shown in navigation.
    pub display_name: String,

    /// Frontend route the dashboard is served under.
    pub route: String,

    /// Inactive dashboards disappear from navigation and deny all access.
    pub is_active: bool,

    /// Position in navigation menus.
    pub sort_order: i32,

    /// When the dashboard was registered.
    pub created_at: DateTime<Utc>,
}

/// Request to register a dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDashboard {
    pub name: String,
    pub display_name: String,
    pub route: String,
    #[serde(default)]
    pub sort_order: i32,
}

impl Dashboard {
    /// Find a dashboard by its exact name.
    pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM dashboards
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(executor)
        .await
    }

    /// List active dashboards in navigation order.
    pub async fn list_active<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM dashboards
            WHERE is_active = TRUE
            ORDER BY sort_order, name
            ",
        )
        .fetch_all(executor)
        .await
    }

    /// Register a new dashboard.
    pub async fn create<'e, E>(executor: E, input: CreateDashboard) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO dashboards (name, display_name, route, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(&input.name)
        .bind(&input.display_name)
        .bind(&input.route)
        .bind(input.sort_order)
        .fetch_one(executor)
        .await
    }

    /// Activate or deactivate a dashboard. Returns `None` for unknown names.
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
            UPDATE dashboards
            SET is_active = $2
            WHERE name = $1
            RETURNING *
            ",
        )
        .bind(name)
        .bind(active)
        .fetch_optional(executor)
        .await
    }
}
