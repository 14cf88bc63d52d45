//! Client Data Scope
//!
//! The resolved set of client-tree nodes a principal may see. Produced by
//! scope resolution in the authorization layer and consumed by every query
//! that touches client-scoped data.

use crate::ClientId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// The set of client nodes a principal's queries are restricted to.
///
/// `Unrestricted` is a marker, not a materialized set: admin queries carry
/// no client predicate at all rather than an `IN` list of every client.
/// `Nodes` is an explicit allow-list; when it is empty the principal can
/// see nothing and callers short-circuit to an empty result without
/// executing a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "client_ids", rename_all = "snake_case")]
pub enum ClientScope {
    /// Universal visibility. Queries are not filtered by client.
    Unrestricted,
    /// Visibility limited to exactly these client nodes.
    Nodes(HashSet<ClientId>),
}

impl ClientScope {
    /// Scope covering every client. Only admins resolve to this.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::Unrestricted
    }

    /// The empty scope: no client is visible.
    #[must_use]
    pub fn none() -> Self {
        Self::Nodes(HashSet::new())
    }

    /// Scope covering exactly the given clients.
    #[must_use]
    pub fn of(ids: impl IntoIterator<Item = ClientId>) -> Self {
        Self::Nodes(ids.into_iter().collect())
    }

    /// Returns true when queries under this scope need no client predicate.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Returns true when the scope contains no clients at all.
    ///
    /// An unrestricted scope is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unrestricted => false,
            Self::Nodes(ids) => ids.is_empty(),
        }
    }

    /// Returns true if data belonging to `client_id` is visible under this
    /// scope.
    #[must_use]
    pub fn allows(&self, client_id: ClientId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Nodes(ids) => ids.contains(&client_id),
        }
    }

    /// Number of clients in scope, or `None` when unrestricted.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Unrestricted => None,
            Self::Nodes(ids) => Some(ids.len()),
        }
    }

    /// The scoped client ids as a sorted `Vec<Uuid>` ready to bind as a
    /// Postgres array parameter. Sorting keeps query text and plans stable
    /// across runs. Returns an empty vec for `Unrestricted`; callers must
    /// check `is_unrestricted` first.
    #[must_use]
    pub fn id_vec(&self) -> Vec<Uuid> {
        match self {
            Self::Unrestricted => Vec::new(),
            Self::Nodes(ids) => {
                let mut v: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
                v.sort_unstable();
                v
            }
        }
    }

    /// SQL predicate fragment for this scope, or `None` when no predicate
    /// is needed.
    ///
    /// For `Nodes` this is `"<column> = ANY($<n>)"` with the id array bound
    /// at parameter position `n`. The fragment is emitted even for an empty
    /// node set: binding an empty array matches no rows, so a caller that
    /// forgets to short-circuit the empty scope still returns nothing.
    #[must_use]
    pub fn sql_predicate(&self, column: &str, bind_index: usize) -> Option<String> {
        match self {
            Self::Unrestricted => None,
            Self::Nodes(_) => Some(format!("{column} = ANY(${bind_index})")),
        }
    }
}

impl FromIterator<ClientId> for ClientScope {
    fn from_iter<T: IntoIterator<Item = ClientId>>(iter: T) -> Self {
        Self::of(iter)
    }
}
