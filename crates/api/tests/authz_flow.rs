//! Black-box tests over the full HTTP surface, with in-memory storage.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use helmgate_api::{AppState, build_router};
use helmgate_auth::password::hash_password;
use helmgate_auth::{PermissionStore, PolicyTable, Role, SessionVerifier, TokenSigner};
use helmgate_core::{AuthError, AuthResult, ClusterId, UserId};
use helmgate_infra::{
    InMemoryAuditStore, InMemoryClusterStore, InMemoryPermissionStore, InMemorySettingsStore,
    InMemoryUserStore, OperationLogRow, RecorderConfig, spawn_recorder,
};

const JWT_SECRET: &[u8] = b"black-box-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    users: Arc<InMemoryUserStore>,
    permissions: Arc<InMemoryPermissionStore>,
    clusters: Arc<InMemoryClusterStore>,
    audit: Arc<InMemoryAuditStore>,
}

impl TestServer {
    async fn spawn() -> Self {
        let permissions = Arc::new(InMemoryPermissionStore::new());
        Self::spawn_with_permissions(permissions.clone(), permissions).await
    }

    /// Build the prod router with in-memory adapters, binding an ephemeral
    /// port. `store` is what the engine resolves against; `fixture` is the
    /// handle tests use to seed assignments.
    async fn spawn_with_permissions(
        store: Arc<dyn PermissionStore>,
        fixture: Arc<InMemoryPermissionStore>,
    ) -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let clusters = Arc::new(InMemoryClusterStore::new());
        let settings = Arc::new(InMemorySettingsStore::new());
        let audit_store = Arc::new(InMemoryAuditStore::new());

        let (audit, _writer) = spawn_recorder(audit_store.clone(), RecorderConfig::default());

        let state = AppState {
            verifier: Arc::new(SessionVerifier::new(TokenSigner::new(JWT_SECRET))),
            users: users.clone(),
            permissions: store,
            clusters: clusters.clone(),
            settings,
            policy: Arc::new(PolicyTable::default()),
            audit,
        };

        let app = build_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handle,
            users,
            permissions: fixture,
            clusters,
            audit: audit_store,
        }
    }

    fn add_user(&self, username: &str, password: &str, platform_admin: bool) -> UserId {
        self.users
            .insert_active(username, &hash_password(password).unwrap(), platform_admin)
    }

    async fn login(&self, client: &reqwest::Client, username: &str, password: &str) -> String {
        let res = client
            .post(format!("{}/api/v1/auth/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn authorize(
        &self,
        client: &reqwest::Client,
        token: &str,
        cluster: ClusterId,
        namespace: Option<&str>,
        action: &str,
    ) -> reqwest::Response {
        client
            .post(format!("{}/api/v1/authorize", self.base_url))
            .bearer_auth(token)
            .json(&json!({
                "cluster_id": cluster,
                "namespace": namespace,
                "resource_name": "web-0",
                "action": action,
            }))
            .send()
            .await
            .unwrap()
    }

    /// Recording is fire-and-forget; poll briefly until the writer catches up.
    async fn wait_for_audit_rows(&self, n: usize) -> Vec<OperationLogRow> {
        for _ in 0..100 {
            let rows = self.audit.rows();
            if rows.len() >= n {
                return rows;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {n} audit rows, have {}",
            self.audit.rows().len()
        );
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn dev_role_flow_allows_workloads_and_records_decisions() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let alice = server.add_user("alice", "hunter2", false);
    let cluster = server.clusters.insert("prod-eu");
    server
        .permissions
        .upsert_assignment(alice, Some(cluster), Some("dev-team"), Role::Dev);

    let token = server.login(&client, "alice", "hunter2").await;

    let res = server
        .authorize(&client, &token, cluster, Some("dev-team"), "pod:delete")
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], json!(true));
    assert_eq!(body["role"], json!("dev"));

    // dev has no business draining nodes
    let res = server
        .authorize(&client, &token, cluster, Some("dev-team"), "node:drain")
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // outside the assigned namespace there is no role at all
    let res = server
        .authorize(&client, &token, cluster, Some("prod"), "pod:delete")
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let rows = server.wait_for_audit_rows(3).await;
    assert_eq!(rows[0].operation, "pod:delete");
    assert_eq!(rows[0].status, "allowed");
    assert_eq!(rows[0].username, "alice");
    assert_eq!(rows[0].cluster_name.as_deref(), Some("prod-eu"));
    assert_eq!(rows[1].operation, "node:drain");
    assert_eq!(rows[1].status, "denied");
}

#[tokio::test]
async fn platform_admin_needs_no_assignment_rows() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    server.add_user("root", "s3cret", true);
    let cluster = server.clusters.insert("prod-us");

    let token = server.login(&client, "root", "s3cret").await;
    let res = server
        .authorize(&client, &token, cluster, None, "node:drain")
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["role"], json!("admin"));
}

#[tokio::test]
async fn unknown_or_deleted_cluster_is_masked_as_forbidden() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    server.add_user("alice", "hunter2", false);
    let token = server.login(&client, "alice", "hunter2").await;

    let res = server
        .authorize(&client, &token, ClusterId::new(), Some("prod"), "pod:delete")
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], json!("forbidden"));

    let cluster = server.clusters.insert("retired");
    server.clusters.soft_delete(cluster);
    let res = server
        .authorize(&client, &token, cluster, Some("prod"), "pod:delete")
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn out_of_taxonomy_actions_are_denied_at_the_edge() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    server.add_user("root", "s3cret", true);
    let cluster = server.clusters.insert("prod-eu");
    let token = server.login(&client, "root", "s3cret").await;

    let res = server
        .authorize(&client, &token, cluster, None, "pod:teleport")
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_token_resets_session_but_exempt_paths_do_not() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let alice = server.add_user("alice", "hunter2", false);
    let cluster = server.clusters.insert("prod-eu");
    server
        .permissions
        .upsert_assignment(alice, Some(cluster), None, Role::ReadOnly);
    let token = server.login(&client, "alice", "hunter2").await;

    // Protected route without a token: rejection plus session reset.
    let res = client
        .post(format!("{}/api/v1/authorize", server.base_url))
        .json(&json!({ "cluster_id": cluster, "action": "view" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["session_reset"], json!(true));

    // Password change with a garbage token: raw failure, no session reset.
    let res = client
        .post(format!("{}/api/v1/auth/password", server.base_url))
        .bearer_auth("garbage")
        .json(&json!({ "current_password": "x", "new_password": "y" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["session_reset"], json!(false));

    // Failed login: invalid credential, never a session reset.
    let res = client
        .post(format!("{}/api/v1/auth/login", server.base_url))
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], json!("invalid_credential"));
    assert_eq!(body["session_reset"], json!(false));

    // Alice's unrelated session is still perfectly valid.
    let res = server
        .authorize(&client, &token, cluster, Some("prod"), "view")
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn change_password_end_to_end() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    server.add_user("alice", "hunter2", false);
    let token = server.login(&client, "alice", "hunter2").await;

    let res = client
        .post(format!("{}/api/v1/auth/password", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "current_password": "wrong", "new_password": "brand-new" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/api/v1/auth/password", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "current_password": "hunter2", "new_password": "brand-new" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    server.login(&client, "alice", "brand-new").await;
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
async fn permission_store_outage_is_a_retryable_service_error() {
    let server = TestServer::spawn_with_permissions(
        Arc::new(UnreachablePermissionStore),
        Arc::new(InMemoryPermissionStore::new()),
    )
    .await;
    let client = reqwest::Client::new();

    server.add_user("alice", "hunter2", false);
    let cluster = server.clusters.insert("prod-eu");
    let token = server.login(&client, "alice", "hunter2").await;

    let res = server
        .authorize(&client, &token, cluster, Some("prod"), "pod:delete")
        .await;

    // Fail closed, but distinguishable from a deny.
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["retryable"], json!(true));
}
