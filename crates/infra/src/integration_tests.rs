//! Cross-module tests over the in-memory adapters: role resolution against
//! the permission store, and the full login/verify/change-password cycle.

use async_trait::async_trait;
use chrono::Duration;

use helmgate_auth::password::hash_password;
use helmgate_auth::{PermissionStore, Role, SessionVerifier, TokenSigner, resolve_role};
use helmgate_core::{AuthError, AuthResult, ClusterId, UserId};

use crate::stores::permission::InMemoryPermissionStore;
use crate::stores::user::InMemoryUserStore;

fn verifier() -> SessionVerifier {
    SessionVerifier::new(TokenSigner::new(b"integration-secret"))
}

// ─── Permission resolution ──────────────────────────────────────────────────

#[tokio::test]
async fn exact_namespace_beats_cluster_wildcard() {
    let store = InMemoryPermissionStore::new();
    let user = UserId::new();
    let cluster = ClusterId::new();

    store.upsert_assignment(user, Some(cluster), Some("prod"), Role::Admin);
    store.upsert_assignment(user, Some(cluster), None, Role::ReadOnly);

    let role = resolve_role(&store, user, false, cluster, Some("prod"))
        .await
        .unwrap();
    assert_eq!(role, Role::Admin);

    let role = resolve_role(&store, user, false, cluster, Some("staging"))
        .await
        .unwrap();
    assert_eq!(role, Role::ReadOnly);
}

#[tokio::test]
async fn namespace_less_actions_use_only_the_wildcard_row() {
    let store = InMemoryPermissionStore::new();
    let user = UserId::new();
    let cluster = ClusterId::new();

    store.upsert_assignment(user, Some(cluster), Some("prod"), Role::Admin);

    // Cluster-scoped action: the "prod" row must not leak in.
    let role = resolve_role(&store, user, false, cluster, None)
        .await
        .unwrap();
    assert_eq!(role, Role::None);

    store.upsert_assignment(user, Some(cluster), None, Role::Ops);
    let role = resolve_role(&store, user, false, cluster, None)
        .await
        .unwrap();
    assert_eq!(role, Role::Ops);
}

#[tokio::test]
async fn no_assignment_is_an_implicit_deny() {
    let store = InMemoryPermissionStore::new();
    let role = resolve_role(&store, UserId::new(), false, ClusterId::new(), Some("prod"))
        .await
        .unwrap();
    assert_eq!(role, Role::None);
}

#[tokio::test]
async fn platform_admin_bypasses_the_store_entirely() {
    // Zero assignment rows; the flag alone resolves to admin.
    let store = InMemoryPermissionStore::new();
    let role = resolve_role(&store, UserId::new(), true, ClusterId::new(), Some("prod"))
        .await
        .unwrap();
    assert_eq!(role, Role::Admin);
}

#[tokio::test]
async fn assignment_upsert_is_idempotent() {
    let store = InMemoryPermissionStore::new();
    let user = UserId::new();
    let cluster = ClusterId::new();

    store.upsert_assignment(user, Some(cluster), None, Role::Dev);
    store.upsert_assignment(user, Some(cluster), None, Role::Ops);

    assert_eq!(store.assignment_count(), 1);
    let role = resolve_role(&store, user, false, cluster, Some("anything"))
        .await
        .unwrap();
    assert_eq!(role, Role::Ops);
}

#[tokio::test]
async fn other_clusters_assignments_do_not_apply() {
    let store = InMemoryPermissionStore::new();
    let user = UserId::new();
    let cluster_a = ClusterId::new();
    let cluster_b = ClusterId::new();

    store.upsert_assignment(user, Some(cluster_a), None, Role::Admin);

    let role = resolve_role(&store, user, false, cluster_b, Some("prod"))
        .await
        .unwrap();
    assert_eq!(role, Role::None);
}

struct UnreachablePermissionStore;

#[async_trait]
impl PermissionStore for UnreachablePermissionStore {
    async fn find_assignment(
        &self,
        _user: UserId,
        _cluster: ClusterId,
        _namespace: Option<&str>,
    ) -> AuthResult<Option<Role>> {
        Err(AuthError::storage("connection refused"))
    }
}

#[tokio::test]
async fn store_failure_fails_closed_as_service_error() {
    let err = resolve_role(
        &UnreachablePermissionStore,
        UserId::new(),
        false,
        ClusterId::new(),
        Some("prod"),
    )
    .await
    .unwrap_err();

    assert!(err.is_retryable());
    assert!(matches!(err, AuthError::StorageUnavailable(_)));
}

// ─── Login / verify / change password ───────────────────────────────────────

#[tokio::test]
async fn login_mints_a_verifiable_token_and_touches_last_login() {
    let users = InMemoryUserStore::new();
    let id = users.insert_active("alice", &hash_password("hunter2").unwrap(), false);
    let verifier = verifier();

    assert!(users.last_login_at(id).is_none());

    let issued = verifier
        .login(&users, "alice", "hunter2", Duration::hours(24))
        .await
        .unwrap();

    let session = verifier.verify(&issued.token).unwrap();
    assert_eq!(session.user_id, id);
    assert_eq!(session.username, "alice");
    assert!(!session.platform_admin);
    assert!(users.last_login_at(id).is_some());
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let users = InMemoryUserStore::new();
    users.insert_active("alice", &hash_password("hunter2").unwrap(), false);
    let verifier = verifier();

    let wrong = verifier
        .login(&users, "alice", "hunter3", Duration::hours(24))
        .await
        .unwrap_err();
    let unknown = verifier
        .login(&users, "bob", "hunter2", Duration::hours(24))
        .await
        .unwrap_err();

    assert_eq!(wrong, AuthError::InvalidCredential);
    assert_eq!(unknown, AuthError::InvalidCredential);
}

#[tokio::test]
async fn disabled_account_cannot_log_in() {
    let users = InMemoryUserStore::new();
    let id = users.insert_active("alice", &hash_password("hunter2").unwrap(), false);
    users.disable(id);

    let err = verifier()
        .login(&users, "alice", "hunter2", Duration::hours(24))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredential);
}

#[tokio::test]
async fn change_password_requires_the_current_secret() {
    let users = InMemoryUserStore::new();
    let id = users.insert_active("alice", &hash_password("hunter2").unwrap(), false);
    let verifier = verifier();

    let err = verifier
        .change_password(&users, id, "wrong", "new-password")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredential);

    verifier
        .change_password(&users, id, "hunter2", "new-password")
        .await
        .unwrap();

    // Old secret no longer works, new one does.
    let err = verifier
        .login(&users, "alice", "hunter2", Duration::hours(24))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredential);
    verifier
        .login(&users, "alice", "new-password", Duration::hours(24))
        .await
        .unwrap();
}
