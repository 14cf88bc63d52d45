//! Client hierarchy arena.
//!
//! An in-memory snapshot of the client tree, validated at construction.
//! Every node carries its full ancestor chain (`hierarchy_path`, root
//! first, the node itself last), so ancestry tests and subtree collection
//! are array operations on stored paths rather than recursive walks.
//!
//! Construction rejects malformed snapshots outright: a forest, a missing
//! parent, a path that disagrees with the parent linkage, or a cycle all
//! fail validation, and callers treat that as a configuration defect
//! rather than working with a partial tree.

use gridmon_core::ClientId;
use gridmon_db::{ClientNode, ClientType};
use std::collections::{HashMap, HashSet};

/// Maximum supported tree depth (root is depth 0).
pub const MAX_HIERARCHY_DEPTH: i32 = 10;

/// Structural defects detected while building a [`ClientHierarchy`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// No node has a null parent.
    #[error("hierarchy has no root node")]
    NoRoot,

    /// More than one node has a null parent.
    #[error("hierarchy has multiple root nodes: {0} and {1}")]
    MultipleRoots(ClientId, ClientId),

    /// Two rows share the same node id.
    #[error("duplicate node id {0}")]
    DuplicateNode(ClientId),

    /// A node references a parent that is not in the snapshot.
    #[error("node {node} references missing parent {parent}")]
    MissingParent { node: ClientId, parent: ClientId },

    /// Parent links loop back on themselves.
    #[error("cycle detected at node {0}")]
    CycleDetected(ClientId),

    /// A node sits deeper than the supported maximum.
    #[error("node {node} exceeds maximum depth {max}")]
    DepthExceeded { node: ClientId, max: i32 },

    /// A stored path or level disagrees with the parent linkage.
    #[error("node {node} has an inconsistent hierarchy path")]
    InconsistentPath { node: ClientId },
}

/// One validated node in the arena.
#[derive(Debug, Clone)]
struct ArenaNode {
    id: ClientId,
    parent_id: Option<ClientId>,
    path: Vec<ClientId>,
    level: i32,
    client_type: ClientType,
    is_active: bool,
}

/// A validated, immutable snapshot of the client tree.
#[derive(Debug, Clone)]
pub struct ClientHierarchy {
    nodes: HashMap<ClientId, ArenaNode>,
    root: ClientId,
}

impl ClientHierarchy {
    /// Build and validate a hierarchy from database rows, using the
    /// default depth limit.
    pub fn from_nodes(rows: Vec<ClientNode>) -> Result<Self, HierarchyError> {
        Self::from_nodes_with_depth(rows, MAX_HIERARCHY_DEPTH)
    }

    /// Build and validate a hierarchy from database rows.
    ///
    /// The snapshot must contain every node, active or not; deactivated
    /// nodes stay in the arena so paths through them remain checkable,
    /// and are excluded from [`Self::subtree_of`] and
    /// [`Self::active_ids`] instead.
    pub fn from_nodes_with_depth(
        rows: Vec<ClientNode>,
        max_depth: i32,
    ) -> Result<Self, HierarchyError> {
        let mut nodes: HashMap<ClientId, ArenaNode> = HashMap::with_capacity(rows.len());
        let mut root: Option<ClientId> = None;

        for row in rows {
            let id = ClientId::from_uuid(row.id);
            let parent_id = row.parent_id.map(ClientId::from_uuid);
            let path: Vec<ClientId> = row
                .hierarchy_path
                .iter()
                .copied()
                .map(ClientId::from_uuid)
                .collect();

            if parent_id.is_none() {
                match root {
                    None => root = Some(id),
                    Some(existing) => return Err(HierarchyError::MultipleRoots(existing, id)),
                }
            }

            if row.hierarchy_level > max_depth {
                return Err(HierarchyError::DepthExceeded {
                    node: id,
                    max: max_depth,
                });
            }

            let node = ArenaNode {
                id,
                parent_id,
                path,
                level: row.hierarchy_level,
                client_type: row.client_type,
                is_active: row.is_active,
            };
            if nodes.insert(id, node).is_some() {
                return Err(HierarchyError::DuplicateNode(id));
            }
        }

        let root = root.ok_or(HierarchyError::NoRoot)?;
        let hierarchy = Self { nodes, root };
        hierarchy.validate()?;
        Ok(hierarchy)
    }

    fn validate(&self) -> Result<(), HierarchyError> {
        for node in self.nodes.values() {
            // Path must end at the node itself and match the declared level.
            let path_ok = node.path.last() == Some(&node.id)
                && node.path.len() as i32 == node.level + 1;
            if !path_ok {
                return Err(HierarchyError::InconsistentPath { node: node.id });
            }

            match node.parent_id {
                None => {
                    if node.level != 0 || node.path.len() != 1 {
                        return Err(HierarchyError::InconsistentPath { node: node.id });
                    }
                }
                Some(parent_id) => {
                    let parent = self.nodes.get(&parent_id).ok_or(
                        HierarchyError::MissingParent {
                            node: node.id,
                            parent: parent_id,
                        },
                    )?;
                    // Path must be the parent's path extended by this node.
                    let extends_parent = node.path.len() == parent.path.len() + 1
                        && node.path[..parent.path.len()] == parent.path[..];
                    if !extends_parent {
                        return Err(HierarchyError::InconsistentPath { node: node.id });
                    }
                }
            }

            // Bounded walk to the root; a loop in parent links would
            // otherwise never terminate.
            let mut current = node.id;
            let mut hops = 0;
            while let Some(parent_id) = self.nodes.get(&current).and_then(|n| n.parent_id) {
                if parent_id == node.id {
                    return Err(HierarchyError::CycleDetected(node.id));
                }
                hops += 1;
                if hops > self.nodes.len() {
                    return Err(HierarchyError::CycleDetected(node.id));
                }
                current = parent_id;
            }
            if current != self.root {
                return Err(HierarchyError::CycleDetected(node.id));
            }
        }
        Ok(())
    }

    /// The root node id.
    #[must_use]
    pub fn root(&self) -> ClientId {
        self.root
    }

    /// Total node count, active and inactive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the arena holds no nodes. Never true for a validated
    /// hierarchy, which always has a root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is present in the snapshot at all.
    #[must_use]
    pub fn contains(&self, id: ClientId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Whether `id` is present and active.
    #[must_use]
    pub fn is_active(&self, id: ClientId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.is_active)
    }

    /// The node's type, when present.
    #[must_use]
    pub fn client_type(&self, id: ClientId) -> Option<ClientType> {
        self.nodes.get(&id).map(|n| n.client_type)
    }

    /// Whether `ancestor` lies on `node`'s path, the node itself included.
    ///
    /// Paths are bounded by the depth limit, so this is a constant-time
    /// check in practice.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: ClientId, node: ClientId) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|n| n.path.contains(&ancestor))
    }

    /// All active node ids in the closed subtree rooted at `root`: the
    /// node itself plus every active descendant. Returns the empty set
    /// when `root` is unknown or inactive.
    #[must_use]
    pub fn subtree_of(&self, root: ClientId) -> HashSet<ClientId> {
        if !self.is_active(root) {
            return HashSet::new();
        }
        self.nodes
            .values()
            .filter(|n| n.is_active && n.path.contains(&root))
            .map(|n| n.id)
            .collect()
    }

    /// Every active node id in the tree.
    #[must_use]
    pub fn active_ids(&self) -> HashSet<ClientId> {
        self.nodes
            .values()
            .filter(|n| n.is_active)
            .map(|n| n.id)
            .collect()
    }
}
