//! Cluster store: existence checks for scope resolution.
//!
//! Clusters are soft-deleted, never physically removed while audit history
//! references them; a soft-deleted cluster is simply invisible here, which
//! makes requests against it resolve to `ScopeNotFound`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use helmgate_core::{AuthResult, ClusterId};

use super::map_sqlx_error;

/// The slice of a cluster row scope resolution and audit need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRef {
    pub id: ClusterId,
    pub name: String,
}

#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Active (non-soft-deleted) cluster by id.
    async fn find_active(&self, id: ClusterId) -> AuthResult<Option<ClusterRef>>;
}

#[derive(Debug, Clone)]
pub struct PostgresClusterStore {
    pool: PgPool,
}

impl PostgresClusterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClusterStore for PostgresClusterStore {
    #[instrument(skip(self), fields(cluster = %id))]
    async fn find_active(&self, id: ClusterId) -> AuthResult<Option<ClusterRef>> {
        let row = sqlx::query("SELECT id, name FROM clusters WHERE id = $1 AND deleted_at IS NULL")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("clusters lookup", e))?;

        row.map(|r| -> Result<ClusterRef, sqlx::Error> {
            let id: Uuid = r.try_get("id")?;
            Ok(ClusterRef {
                id: ClusterId::from_uuid(id),
                name: r.try_get("name")?,
            })
        })
        .transpose()
        .map_err(|e| map_sqlx_error("clusters lookup", e))
    }
}

/// In-memory cluster store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryClusterStore {
    rows: RwLock<HashMap<ClusterId, (String, bool)>>,
}

impl InMemoryClusterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: &str) -> ClusterId {
        let id = ClusterId::new();
        self.rows
            .write()
            .expect("cluster store lock poisoned")
            .insert(id, (name.to_string(), true));
        id
    }

    pub fn soft_delete(&self, id: ClusterId) {
        if let Some(entry) = self
            .rows
            .write()
            .expect("cluster store lock poisoned")
            .get_mut(&id)
        {
            entry.1 = false;
        }
    }
}

#[async_trait]
impl ClusterStore for InMemoryClusterStore {
    async fn find_active(&self, id: ClusterId) -> AuthResult<Option<ClusterRef>> {
        Ok(self
            .rows
            .read()
            .expect("cluster store lock poisoned")
            .get(&id)
            .filter(|(_, active)| *active)
            .map(|(name, _)| ClusterRef {
                id,
                name: name.clone(),
            }))
    }
}
