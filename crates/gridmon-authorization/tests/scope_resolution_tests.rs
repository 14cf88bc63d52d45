//! Integration tests for client scope resolution.
//!
//! Covers admin universal visibility, branch-admin closed subtrees,
//! single-client scoping for regular users, the empty fail-closed scope,
//! and hierarchy defects.

mod common;

use common::TestContext;
use gridmon_core::{ClientId, Principal, UserId};
use gridmon_db::ClientType;

#[tokio::test]
async fn test_admin_sees_every_active_node_regardless_of_assignment() {
    let ctx = TestContext::new().await;
    let root = ctx.seed_root().await;
    let division = ctx.add_child(&root, ClientType::Division).await;
    let site = ctx.add_child(&division, ClientType::Site).await;

    // Assignment must not narrow an admin.
    let assigned = Principal::new(UserId::new(), "admin", ClientId::from_uuid(site.id));
    let unassigned = Principal::unassigned(UserId::new(), "admin");

    for principal in [&assigned, &unassigned] {
        let ids = ctx.engine.accessible_client_ids(principal).await.unwrap();
        assert_eq!(ids.len(), 3);
        for node in [&root, &division, &site] {
            assert!(ids.contains(&ClientId::from_uuid(node.id)));
        }
    }
}

#[tokio::test]
async fn test_branch_admin_gets_closed_subtree_excluding_siblings() {
    let ctx = TestContext::new().await;
    let root = ctx.seed_root().await;
    let division = ctx.add_child(&root, ClientType::Division).await;
    let site = ctx.add_child(&division, ClientType::Site).await;
    let sibling_site = ctx.add_child(&root, ClientType::Site).await;

    let principal = Principal::new(
        UserId::new(),
        "branch_admin",
        ClientId::from_uuid(division.id),
    );
    let ids = ctx.engine.accessible_client_ids(&principal).await.unwrap();

    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&ClientId::from_uuid(division.id)));
    assert!(ids.contains(&ClientId::from_uuid(site.id)));
    assert!(!ids.contains(&ClientId::from_uuid(root.id)));
    assert!(!ids.contains(&ClientId::from_uuid(sibling_site.id)));
}

#[tokio::test]
async fn test_new_descendant_is_included_without_invalidation() {
    let ctx = TestContext::new().await;
    let root = ctx.seed_root().await;
    let division = ctx.add_child(&root, ClientType::Division).await;

    let principal = Principal::new(
        UserId::new(),
        "branch_admin",
        ClientId::from_uuid(division.id),
    );
    let before = ctx.engine.accessible_client_ids(&principal).await.unwrap();
    assert_eq!(before.len(), 1);

    // Scope derives from stored paths at resolve time, so a node added
    // under the anchor shows up on the very next resolution.
    let new_site = ctx.add_child(&division, ClientType::Site).await;
    let after = ctx.engine.accessible_client_ids(&principal).await.unwrap();
    assert_eq!(after.len(), 2);
    assert!(after.contains(&ClientId::from_uuid(new_site.id)));
}

#[tokio::test]
async fn test_regular_user_sees_exactly_their_client() {
    let ctx = TestContext::new().await;
    let root = ctx.seed_root().await;
    let division = ctx.add_child(&root, ClientType::Division).await;
    let site = ctx.add_child(&division, ClientType::Site).await;
    let sibling = ctx.add_child(&division, ClientType::Site).await;

    for role in ["user", "viewer"] {
        let principal = Principal::new(UserId::new(), role, ClientId::from_uuid(site.id));
        let ids = ctx.engine.accessible_client_ids(&principal).await.unwrap();

        assert_eq!(ids.len(), 1, "{role} must see exactly one client");
        assert!(ids.contains(&ClientId::from_uuid(site.id)));
        assert!(!ids.contains(&ClientId::from_uuid(division.id)));
        assert!(!ids.contains(&ClientId::from_uuid(sibling.id)));
    }
}

#[tokio::test]
async fn test_unassigned_non_admin_resolves_empty() {
    let ctx = TestContext::new().await;
    ctx.seed_root().await;

    for role in ["viewer", "user", "branch_admin"] {
        let principal = Principal::unassigned(UserId::new(), role);
        let scope = ctx.engine.resolve_scope(&principal).await.unwrap();
        assert!(scope.is_empty(), "unassigned {role} must resolve empty");
        assert!(ctx
            .engine
            .accessible_client_ids(&principal)
            .await
            .unwrap()
            .is_empty());
    }
}

#[tokio::test]
async fn test_deactivated_node_leaves_every_scope() {
    let ctx = TestContext::new().await;
    let root = ctx.seed_root().await;
    let division = ctx.add_child(&root, ClientType::Division).await;
    let site = ctx.add_child(&division, ClientType::Site).await;

    ctx.hierarchy.set_node_active(site.id, false).await;

    let admin = Principal::unassigned(UserId::new(), "admin");
    let admin_ids = ctx.engine.accessible_client_ids(&admin).await.unwrap();
    assert!(!admin_ids.contains(&ClientId::from_uuid(site.id)));

    let branch = Principal::new(
        UserId::new(),
        "branch_admin",
        ClientId::from_uuid(division.id),
    );
    let branch_ids = ctx.engine.accessible_client_ids(&branch).await.unwrap();
    assert!(!branch_ids.contains(&ClientId::from_uuid(site.id)));

    let regular = Principal::new(UserId::new(), "user", ClientId::from_uuid(site.id));
    assert!(ctx
        .engine
        .resolve_scope(&regular)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_deactivated_anchor_empties_the_branch_scope() {
    let ctx = TestContext::new().await;
    let root = ctx.seed_root().await;
    let division = ctx.add_child(&root, ClientType::Division).await;
    ctx.add_child(&division, ClientType::Site).await;

    ctx.hierarchy.set_node_active(division.id, false).await;

    let principal = Principal::new(
        UserId::new(),
        "branch_admin",
        ClientId::from_uuid(division.id),
    );
    let scope = ctx.engine.resolve_scope(&principal).await.unwrap();
    assert!(scope.is_empty());
}

#[tokio::test]
async fn test_corrupt_hierarchy_fails_closed_for_everyone() {
    let ctx = TestContext::new().await;
    let root = ctx.seed_root().await;
    let division = ctx.add_child(&root, ClientType::Division).await;
    // A second root row is a structural defect the snapshot must reject.
    ctx.hierarchy.insert_node(common::make_root("Rogue")).await;

    let admin = Principal::unassigned(UserId::new(), "admin");
    let branch = Principal::new(
        UserId::new(),
        "branch_admin",
        ClientId::from_uuid(division.id),
    );
    let regular = Principal::new(UserId::new(), "user", ClientId::from_uuid(division.id));

    for principal in [&admin, &branch, &regular] {
        let scope = ctx.engine.resolve_scope(principal).await.unwrap();
        assert!(scope.is_empty(), "corrupt tree must scope everyone to nothing");
    }
}

#[tokio::test]
async fn test_hierarchy_outage_is_an_error() {
    let ctx = TestContext::new().await;
    let root = ctx.seed_root().await;
    let principal = Principal::new(UserId::new(), "user", ClientId::from_uuid(root.id));

    ctx.hierarchy.set_fail_loads(true);
    assert!(ctx.engine.resolve_scope(&principal).await.is_err());
    assert!(ctx.engine.accessible_client_ids(&principal).await.is_err());

    ctx.hierarchy.set_fail_loads(false);
    assert_eq!(
        ctx.engine
            .accessible_client_ids(&principal)
            .await
            .unwrap()
            .len(),
        1
    );
}
