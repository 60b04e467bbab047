//! Append-only audit storage (`operation_logs`).
//!
//! The recorder is the sole writer. Rows are immutable once appended;
//! retention/purge is an external job driven by the `log_retention` setting.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use helmgate_core::{AuthResult, ClusterId, UserId};

use crate::stores::map_sqlx_error;

/// One `operation_logs` row, ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationLogRow {
    pub id: Uuid,
    pub user_id: UserId,
    pub username: String,
    pub cluster_id: Option<ClusterId>,
    pub cluster_name: Option<String>,
    pub resource_type: String,
    pub resource_name: Option<String>,
    pub namespace: Option<String>,
    pub operation: String,
    pub status: String,
    pub detail: Option<String>,
    pub request_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one row. Independent across requests; no write-write conflicts.
    async fn append(&self, row: &OperationLogRow) -> AuthResult<()>;
}

#[derive(Debug, Clone)]
pub struct PostgresAuditStore {
    pool: PgPool,
}

impl PostgresAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn append(&self, row: &OperationLogRow) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO operation_logs (
                id, user_id, username, cluster_id, cluster_name,
                resource_type, resource_name, namespace, operation, status,
                detail, request_ip, user_agent, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(row.id)
        .bind(*row.user_id.as_uuid())
        .bind(&row.username)
        .bind(row.cluster_id.map(|c| *c.as_uuid()))
        .bind(&row.cluster_name)
        .bind(&row.resource_type)
        .bind(&row.resource_name)
        .bind(&row.namespace)
        .bind(&row.operation)
        .bind(&row.status)
        .bind(&row.detail)
        .bind(&row.request_ip)
        .bind(&row.user_agent)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("operation_logs append", e))?;

        Ok(())
    }
}

/// In-memory audit store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    rows: RwLock<Vec<OperationLogRow>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<OperationLogRow> {
        self.rows.read().expect("audit store lock poisoned").clone()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, row: &OperationLogRow) -> AuthResult<()> {
        self.rows
            .write()
            .expect("audit store lock poisoned")
            .push(row.clone());
        Ok(())
    }
}
