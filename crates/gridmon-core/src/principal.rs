//! Authenticated Principal
//!
//! The identity attributes every authorization question is asked about: who
//! the user is, which role they hold, and which client-tree node (if any)
//! they are anchored to.

use crate::{ClientId, RoleName, UserId};
use serde::{Deserialize, Serialize};

/// An authenticated user as seen by the authorization layer.
///
/// Carries exactly the attributes decisions depend on. Authentication
/// (passwords, sessions, tokens) happens upstream; by the time a `Principal`
/// exists the user is already verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The authenticated user.
    pub user_id: UserId,
    /// The single role held by this user.
    pub role_name: RoleName,
    /// The client-tree node this user is anchored to, when one is assigned.
    ///
    /// Admins typically carry `None` since their visibility is universal.
    /// For branch admins this is the subtree root; for regular users the
    /// single client they belong to. A non-admin with `None` here resolves
    /// to an empty data scope.
    pub assigned_client_id: Option<ClientId>,
}

impl Principal {
    /// Creates a principal with a client assignment.
    #[must_use]
    pub fn new(user_id: UserId, role_name: impl Into<RoleName>, client_id: ClientId) -> Self {
        Self {
            user_id,
            role_name: role_name.into(),
            assigned_client_id: Some(client_id),
        }
    }

    /// Creates a principal with no client assignment.
    #[must_use]
    pub fn unassigned(user_id: UserId, role_name: impl Into<RoleName>) -> Self {
        Self {
            user_id,
            role_name: role_name.into(),
            assigned_client_id: None,
        }
    }

    /// Returns true when the principal is anchored to a client node.
    #[must_use]
    pub fn has_client_assignment(&self) -> bool {
        self.assigned_client_id.is_some()
    }
}
