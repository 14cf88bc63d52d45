//! Client hierarchy model.
//!
//! Clients form a single rooted tree. Every node stores its full ancestor
//! chain in `hierarchy_path` (uuid[], root first, self last), so subtree
//! membership is one array-containment predicate instead of a recursive
//! walk. A node's descendants are exactly the rows whose path contains the
//! node's id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Organizational level of a client-tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "client_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    /// The single top-level node.
    Root,
    /// Enterprise-wide grouping directly under the root.
    Enterprise,
    /// Regional or functional division.
    Division,
    /// Department within a division.
    Department,
    /// Physical site or installation.
    Site,
    /// Leaf client a device fleet reports under.
    Client,
}

impl Display for ClientType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClientType::Root => "root",
            ClientType::Enterprise => "enterprise",
            ClientType::Division => "division",
            ClientType::Department => "department",
            ClientType::Site => "site",
            ClientType::Client => "client",
        };
        write!(f, "{s}")
    }
}

/// A node of the client hierarchy.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ClientNode {
    /// Unique identifier of the node.
    pub id: Uuid,

    /// Human-readable client name.
    pub display_name: String,

    /// Parent node, `None` only for the root.
    pub parent_id: Option<Uuid>,

    /// Depth in the tree. The root is level 0.
    pub hierarchy_level: i32,

    /// Ancestor chain from the root down to and including this node.
    pub hierarchy_path: Vec<Uuid>,

    /// Organizational level of this node.
    pub client_type: ClientType,

    /// Whether devices attach directly to this node.
    pub is_leaf_node: bool,

    /// Deactivated nodes are excluded from every scope computation.
    pub is_active: bool,

    /// When the node was created.
    pub created_at: DateTime<Utc>,

    /// When the node was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Request to attach a new node to the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientNode {
    pub display_name: String,
    /// Parent to attach under; `None` creates the root.
    pub parent_id: Option<Uuid>,
    pub client_type: ClientType,
    #[serde(default)]
    pub is_leaf_node: bool,
}

impl ClientNode {
    /// Load the whole tree in one query, ordered root-first.
    ///
    /// This is the snapshot the authorization layer validates and resolves
    /// scopes against. Inactive nodes are included so the structure can be
    /// checked end to end; scope computations filter them out afterwards.
    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM client_nodes
            ORDER BY hierarchy_level, display_name
            ",
        )
        .fetch_all(executor)
        .await
    }

    /// Load only the active nodes, ordered root-first.
    pub async fn list_active<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM client_nodes
            WHERE is_active = TRUE
            ORDER BY hierarchy_level, display_name
            ",
        )
        .fetch_all(executor)
        .await
    }

    /// Find a node by id.
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM client_nodes
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Ids of the closed subtree rooted at `root_id`: the node itself plus
    /// every active descendant, resolved by one path-containment query.
    pub async fn subtree_ids<'e, E>(executor: E, root_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r"
            SELECT id FROM client_nodes
            WHERE is_active = TRUE AND hierarchy_path @> ARRAY[$1]::uuid[]
            ORDER BY hierarchy_level
            ",
        )
        .bind(root_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Attach a new node under `parent_id`, deriving its level and path
    /// from the parent row. Returns `None` when the parent does not exist
    /// or is inactive.
    ///
    /// With `parent_id = None` this creates the root (level 0, path of one
    /// element); the UNIQUE partial index on parentless rows rejects a
    /// second root.
    pub async fn create<'e, E>(
        executor: E,
        input: CreateClientNode,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let id = Uuid::new_v4();

        match input.parent_id {
            Some(parent_id) => {
                sqlx::query_as(
                    r"
                    INSERT INTO client_nodes (id, display_name, parent_id, hierarchy_level, hierarchy_path, client_type, is_leaf_node)
                    SELECT $1, $2, p.id, p.hierarchy_level + 1, p.hierarchy_path || $1, $3, $4
                    FROM client_nodes p
                    WHERE p.id = $5 AND p.is_active = TRUE
                    RETURNING *
                    ",
                )
                .bind(id)
                .bind(&input.display_name)
                .bind(input.client_type)
                .bind(input.is_leaf_node)
                .bind(parent_id)
                .fetch_optional(executor)
                .await
            }
            None => {
                sqlx::query_as(
                    r"
                    INSERT INTO client_nodes (id, display_name, parent_id, hierarchy_level, hierarchy_path, client_type, is_leaf_node)
                    VALUES ($1, $2, NULL, 0, ARRAY[$1]::uuid[], $3, $4)
                    RETURNING *
                    ",
                )
                .bind(id)
                .bind(&input.display_name)
                .bind(input.client_type)
                .bind(input.is_leaf_node)
                .fetch_optional(executor)
                .await
            }
        }
    }

    /// Activate or deactivate a node. Deactivation is the only removal the
    /// tree supports; rows stay referencable by historical data.
    pub async fn set_active<'e, E>(
        executor: E,
        id: Uuid,
        active: bool,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            UPDATE client_nodes
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(executor)
        .await
    }
}
