//! Client scope resolution.
//!
//! Maps an authenticated principal to the set of client-tree nodes their
//! data queries may touch:
//!
//! - admin: unrestricted, every active client
//! - hierarchy-managing role anchored at node C: the closed subtree under
//!   C, the anchor included
//! - regular role anchored at C: exactly C
//! - any non-admin without an assignment: nothing
//!
//! Subtrees come from the stored ancestor paths in one snapshot load, not
//! from per-level queries; resolution cost does not grow with tree depth.
//! Every path through here that cannot produce a trustworthy scope yields
//! the empty scope, and a storage failure is returned to the caller
//! instead of being absorbed.

use std::collections::HashSet;
use std::sync::Arc;

use gridmon_core::{ClientId, ClientScope, Principal};

use crate::error::Result;
use crate::hierarchy::{ClientHierarchy, MAX_HIERARCHY_DEPTH};
use crate::roles::{RoleDescriptor, ScopeClass, SystemRole};
use crate::store::{HierarchyStore, PermissionStore};

/// Resolves principals to client data scopes.
pub struct ClientScopeResolver {
    roles: Arc<dyn PermissionStore>,
    hierarchy: Arc<dyn HierarchyStore>,
    max_depth: i32,
}

impl ClientScopeResolver {
    /// Create a resolver over the given role registry and hierarchy stores,
    /// using the default depth limit.
    pub fn new(roles: Arc<dyn PermissionStore>, hierarchy: Arc<dyn HierarchyStore>) -> Self {
        Self::with_max_depth(roles, hierarchy, MAX_HIERARCHY_DEPTH)
    }

    /// Create a resolver with an explicit tree depth limit.
    pub fn with_max_depth(
        roles: Arc<dyn PermissionStore>,
        hierarchy: Arc<dyn HierarchyStore>,
        max_depth: i32,
    ) -> Self {
        Self {
            roles,
            hierarchy,
            max_depth,
        }
    }

    /// The client scope for `principal`.
    ///
    /// Unknown and deactivated roles resolve to the empty scope, as does a
    /// hierarchy snapshot that fails validation. Only a storage failure
    /// surfaces as `Err`.
    pub async fn resolve_scope(&self, principal: &Principal) -> Result<ClientScope> {
        let Some(descriptor) = self.descriptor_for(principal).await? else {
            return Ok(ClientScope::none());
        };
        let Some(tree) = self.load_valid_tree().await? else {
            return Ok(ClientScope::none());
        };
        Ok(Self::classify(principal, &descriptor, &tree))
    }

    /// The materialized set of client ids visible to `principal`.
    ///
    /// Same rules as [`Self::resolve_scope`], with the unrestricted admin
    /// scope expanded to every active node in the tree.
    pub async fn accessible_client_ids(&self, principal: &Principal) -> Result<HashSet<ClientId>> {
        let Some(descriptor) = self.descriptor_for(principal).await? else {
            return Ok(HashSet::new());
        };
        let Some(tree) = self.load_valid_tree().await? else {
            return Ok(HashSet::new());
        };
        Ok(match Self::classify(principal, &descriptor, &tree) {
            ClientScope::Unrestricted => tree.active_ids(),
            ClientScope::Nodes(ids) => ids,
        })
    }

    /// Resolve the principal's role to a usable descriptor.
    ///
    /// System roles are answered from the closed enum without a registry
    /// read; custom roles come from storage. `None` means the role cannot
    /// scope anything: it does not exist or has been deactivated.
    async fn descriptor_for(&self, principal: &Principal) -> Result<Option<RoleDescriptor>> {
        let descriptor = match SystemRole::from_name(principal.role_name.as_str()) {
            Some(system) => Some(RoleDescriptor::from(system)),
            None => self.roles.load_role(&principal.role_name).await?,
        };

        match descriptor {
            Some(d) if d.is_active => Ok(Some(d)),
            Some(_) => {
                tracing::warn!(
                    target: "authorization",
                    user_id = %principal.user_id,
                    role = %principal.role_name,
                    "scope requested for deactivated role"
                );
                Ok(None)
            }
            None => {
                tracing::warn!(
                    target: "authorization",
                    user_id = %principal.user_id,
                    role = %principal.role_name,
                    "scope requested for unknown role"
                );
                Ok(None)
            }
        }
    }

    /// Load and validate the hierarchy snapshot.
    ///
    /// A snapshot that fails validation is a configuration defect: it is
    /// logged and `None` is returned so every caller scopes to nothing
    /// until the tree is repaired.
    async fn load_valid_tree(&self) -> Result<Option<ClientHierarchy>> {
        let rows = self.hierarchy.load_nodes().await?;
        match ClientHierarchy::from_nodes_with_depth(rows, self.max_depth) {
            Ok(tree) => Ok(Some(tree)),
            Err(e) => {
                tracing::error!(
                    target: "authorization",
                    error = %e,
                    "client hierarchy snapshot failed validation; scopes resolve empty"
                );
                Ok(None)
            }
        }
    }

    fn classify(
        principal: &Principal,
        descriptor: &RoleDescriptor,
        tree: &ClientHierarchy,
    ) -> ClientScope {
        match descriptor.scope_class() {
            ScopeClass::Admin => ClientScope::unrestricted(),
            ScopeClass::BranchAdmin => match principal.assigned_client_id {
                Some(anchor) if tree.is_active(anchor) => {
                    ClientScope::Nodes(tree.subtree_of(anchor))
                }
                Some(anchor) => {
                    tracing::warn!(
                        target: "authorization",
                        user_id = %principal.user_id,
                        client_id = %anchor,
                        "assigned client is missing or inactive; scope is empty"
                    );
                    ClientScope::none()
                }
                None => {
                    tracing::debug!(
                        target: "authorization",
                        user_id = %principal.user_id,
                        role = %principal.role_name,
                        "no client assignment; scope is empty"
                    );
                    ClientScope::none()
                }
            },
            ScopeClass::Regular => match principal.assigned_client_id {
                Some(client) if tree.is_active(client) => ClientScope::of([client]),
                Some(client) => {
                    tracing::warn!(
                        target: "authorization",
                        user_id = %principal.user_id,
                        client_id = %client,
                        "assigned client is missing or inactive; scope is empty"
                    );
                    ClientScope::none()
                }
                None => {
                    tracing::debug!(
                        target: "authorization",
                        user_id = %principal.user_id,
                        role = %principal.role_name,
                        "no client assignment; scope is empty"
                    );
                    ClientScope::none()
                }
            },
        }
    }
}
