//! Permission assignment store.
//!
//! Assignments are written by the administrative subsystem and only read by
//! the engine. The read path returns at most one row — the best match under
//! scope precedence — from a single query, so an in-flight check can never
//! observe a partially-applied assignment edit.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use helmgate_auth::{PermissionStore, Role};
use helmgate_core::{AuthError, AuthResult, ClusterId, Scope, UserId};

use super::map_sqlx_error;

/// Postgres-backed permission store.
///
/// Reads are guarded by a short timeout; a timeout is surfaced as
/// `StorageUnavailable` and the check fails closed, never open.
#[derive(Debug, Clone)]
pub struct PostgresPermissionStore {
    pool: PgPool,
    read_timeout: Duration,
}

impl PostgresPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            read_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Insert or update an assignment (administrative write path).
    ///
    /// The `(user_id, cluster_id, namespace)` key is unique with NULLs not
    /// distinct, so a conflicting insert updates the existing row's role
    /// instead of duplicating it.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn upsert_assignment(
        &self,
        user: UserId,
        cluster: Option<ClusterId>,
        namespace: Option<&str>,
        role: Role,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, user_id, cluster_id, namespace, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT ON CONSTRAINT permissions_scope_key
            DO UPDATE SET role = EXCLUDED.role, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(*user.as_uuid())
        .bind(cluster.map(|c| *c.as_uuid()))
        .bind(namespace)
        .bind(role.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("permissions upsert", e))?;

        Ok(())
    }
}

#[async_trait]
impl PermissionStore for PostgresPermissionStore {
    #[instrument(skip(self), fields(user = %user, cluster = %cluster))]
    async fn find_assignment(
        &self,
        user: UserId,
        cluster: ClusterId,
        namespace: Option<&str>,
    ) -> AuthResult<Option<Role>> {
        // Exact namespace match sorts before the cluster's wildcard row;
        // a namespace-less request only matches the wildcard row.
        let query = sqlx::query(
            r#"
            SELECT role
            FROM permissions
            WHERE user_id = $1
              AND cluster_id = $2
              AND (namespace = $3 OR namespace IS NULL)
            ORDER BY namespace NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(*user.as_uuid())
        .bind(*cluster.as_uuid())
        .bind(namespace)
        .fetch_optional(&self.pool);

        let row = tokio::time::timeout(self.read_timeout, query)
            .await
            .map_err(|_| AuthError::storage("permission lookup timed out"))?
            .map_err(|e| map_sqlx_error("permissions lookup", e))?;

        match row {
            Some(row) => {
                let role: String = row
                    .try_get("role")
                    .map_err(|e| map_sqlx_error("permissions lookup", e))?;
                Ok(Some(Role::from_stored(&role)))
            }
            None => Ok(None),
        }
    }
}

/// In-memory permission store for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    rows: RwLock<HashMap<(UserId, Scope), Role>>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update an assignment; the scope key stays unique.
    pub fn upsert_assignment(
        &self,
        user: UserId,
        cluster: Option<ClusterId>,
        namespace: Option<&str>,
        role: Role,
    ) {
        let scope = Scope {
            cluster,
            namespace: namespace.map(str::to_string),
        };
        self.rows
            .write()
            .expect("permission store lock poisoned")
            .insert((user, scope), role);
    }

    pub fn assignment_count(&self) -> usize {
        self.rows.read().expect("permission store lock poisoned").len()
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn find_assignment(
        &self,
        user: UserId,
        cluster: ClusterId,
        namespace: Option<&str>,
    ) -> AuthResult<Option<Role>> {
        let rows = self.rows.read().expect("permission store lock poisoned");

        if let Some(ns) = namespace {
            let exact = (user, Scope::namespaced(cluster, ns));
            if let Some(role) = rows.get(&exact) {
                return Ok(Some(*role));
            }
        }

        Ok(rows.get(&(user, Scope::cluster_wide(cluster))).copied())
    }
}
