//! User store: the credential-side slice of the `users` table.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use helmgate_auth::{CredentialStore, UserRecord};
use helmgate_core::{AuthResult, UserId};

use super::map_sqlx_error;

/// Platform-admin flag is carried by `users.role`.
const PLATFORM_ADMIN_ROLE: &str = "admin";

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<UserRecord, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    Ok(UserRecord {
        id: UserId::from_uuid(id),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        platform_admin: role == PLATFORM_ADMIN_ROLE,
    })
}

/// Postgres-backed user store. Soft-deleted and disabled accounts are
/// invisible through this interface.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresUserStore {
    #[instrument(skip(self))]
    async fn find_active_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE username = $1 AND status = 'active' AND deleted_at IS NULL
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users lookup", e))?;

        row.map(|r| record_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("users lookup", e))
    }

    #[instrument(skip(self), fields(user = %id))]
    async fn find_active_by_id(&self, id: UserId) -> AuthResult<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE id = $1 AND status = 'active' AND deleted_at IS NULL
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users lookup", e))?;

        row.map(|r| record_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("users lookup", e))
    }

    #[instrument(skip(self), fields(user = %id))]
    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2, updated_at = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users touch_last_login", e))?;
        Ok(())
    }

    #[instrument(skip(self, hash), fields(user = %id))]
    async fn update_password_hash(&self, id: UserId, hash: &str) -> AuthResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(hash)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users update_password_hash", e))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    record: UserRecord,
    active: bool,
    last_login_at: Option<DateTime<Utc>>,
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    rows: RwLock<HashMap<UserId, StoredUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_active(
        &self,
        username: &str,
        password_hash: &str,
        platform_admin: bool,
    ) -> UserId {
        let id = UserId::new();
        self.rows.write().expect("user store lock poisoned").insert(
            id,
            StoredUser {
                record: UserRecord {
                    id,
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                    platform_admin,
                },
                active: true,
                last_login_at: None,
            },
        );
        id
    }

    /// Disable an account (login and password change stop working).
    pub fn disable(&self, id: UserId) {
        if let Some(user) = self
            .rows
            .write()
            .expect("user store lock poisoned")
            .get_mut(&id)
        {
            user.active = false;
        }
    }

    pub fn last_login_at(&self, id: UserId) -> Option<DateTime<Utc>> {
        self.rows
            .read()
            .expect("user store lock poisoned")
            .get(&id)
            .and_then(|u| u.last_login_at)
    }

    pub fn password_hash(&self, id: UserId) -> Option<String> {
        self.rows
            .read()
            .expect("user store lock poisoned")
            .get(&id)
            .map(|u| u.record.password_hash.clone())
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn find_active_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        Ok(self
            .rows
            .read()
            .expect("user store lock poisoned")
            .values()
            .find(|u| u.active && u.record.username == username)
            .map(|u| u.record.clone()))
    }

    async fn find_active_by_id(&self, id: UserId) -> AuthResult<Option<UserRecord>> {
        Ok(self
            .rows
            .read()
            .expect("user store lock poisoned")
            .get(&id)
            .filter(|u| u.active)
            .map(|u| u.record.clone()))
    }

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> AuthResult<()> {
        if let Some(user) = self
            .rows
            .write()
            .expect("user store lock poisoned")
            .get_mut(&id)
        {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn update_password_hash(&self, id: UserId, hash: &str) -> AuthResult<()> {
        if let Some(user) = self
            .rows
            .write()
            .expect("user store lock poisoned")
            .get_mut(&id)
        {
            user.record.password_hash = hash.to_string();
        }
        Ok(())
    }
}
