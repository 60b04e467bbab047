//! System settings: the handful of knobs the engine reads.
//!
//! Settings live in `system_settings` keyed by (category, name). Absent or
//! malformed rows fall back to defaults so a missing row can never take
//! authentication down.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Duration;
use sqlx::{PgPool, Row};
use tracing::warn;

use helmgate_core::AuthResult;

use super::map_sqlx_error;

pub const DEFAULT_SESSION_TIMEOUT_HOURS: i64 = 24;
pub const DEFAULT_LOG_RETENTION_DAYS: i64 = 30;
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: i64 = 5;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, category: &str, name: &str) -> AuthResult<Option<String>>;
}

fn parse_or_default(setting: &str, value: Option<String>, default: i64) -> i64 {
    match value {
        None => default,
        Some(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(setting, raw, "malformed setting value; using default");
                default
            }
        },
    }
}

/// Credential validity window (`auth/session_timeout`, hours).
pub async fn session_timeout<S>(store: &S) -> AuthResult<Duration>
where
    S: SettingsStore + ?Sized,
{
    let hours = parse_or_default(
        "session_timeout",
        store.get("auth", "session_timeout").await?,
        DEFAULT_SESSION_TIMEOUT_HOURS,
    );
    Ok(Duration::hours(hours))
}

/// Days before audit records become eligible for purge (`log/log_retention`).
/// The purge job itself is an external concern.
pub async fn log_retention_days<S>(store: &S) -> AuthResult<i64>
where
    S: SettingsStore + ?Sized,
{
    Ok(parse_or_default(
        "log_retention",
        store.get("log", "log_retention").await?,
        DEFAULT_LOG_RETENTION_DAYS,
    ))
}

/// Login attempt ceiling (`auth/max_login_attempts`). Stored alongside the
/// other knobs; enforcement lives outside this core.
pub async fn max_login_attempts<S>(store: &S) -> AuthResult<i64>
where
    S: SettingsStore + ?Sized,
{
    Ok(parse_or_default(
        "max_login_attempts",
        store.get("auth", "max_login_attempts").await?,
        DEFAULT_MAX_LOGIN_ATTEMPTS,
    ))
}

#[derive(Debug, Clone)]
pub struct PostgresSettingsStore {
    pool: PgPool,
}

impl PostgresSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PostgresSettingsStore {
    async fn get(&self, category: &str, name: &str) -> AuthResult<Option<String>> {
        let row =
            sqlx::query("SELECT value FROM system_settings WHERE category = $1 AND name = $2")
                .bind(category)
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("settings lookup", e))?;

        row.map(|r| r.try_get("value"))
            .transpose()
            .map_err(|e| map_sqlx_error("settings lookup", e))
    }
}

/// In-memory settings store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    rows: RwLock<HashMap<(String, String), String>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, category: &str, name: &str, value: &str) {
        self.rows
            .write()
            .expect("settings store lock poisoned")
            .insert((category.to_string(), name.to_string()), value.to_string());
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self, category: &str, name: &str) -> AuthResult<Option<String>> {
        Ok(self
            .rows
            .read()
            .expect("settings store lock poisoned")
            .get(&(category.to_string(), name.to_string()))
            .cloned())
    }
}
