//! Database schema for the authorization engine.
//!
//! Column sets are load-bearing: other tooling reads these tables, so they
//! must not drift. `permissions` enforces assignment uniqueness with NULLs
//! not distinct (a NULL cluster/namespace is a wildcard, and there can be
//! only one row per exact scope key); requires PostgreSQL 15+.

use sqlx::PgPool;

pub const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    role TEXT NOT NULL DEFAULT 'user',
    status TEXT NOT NULL DEFAULT 'active',
    last_login_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
)
"#;

pub const CREATE_CLUSTERS: &str = r#"
CREATE TABLE IF NOT EXISTS clusters (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    display_name TEXT,
    description TEXT,
    api_server TEXT NOT NULL,
    kubeconfig TEXT,
    status TEXT NOT NULL DEFAULT 'unknown',
    version TEXT,
    node_count INTEGER,
    pod_count INTEGER,
    last_check_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
)
"#;

pub const CREATE_PERMISSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS permissions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    cluster_id UUID,
    namespace TEXT,
    role TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT permissions_scope_key
        UNIQUE NULLS NOT DISTINCT (user_id, cluster_id, namespace)
)
"#;

pub const CREATE_OPERATION_LOGS: &str = r#"
CREATE TABLE IF NOT EXISTS operation_logs (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    username TEXT NOT NULL,
    cluster_id UUID,
    cluster_name TEXT,
    resource_type TEXT NOT NULL,
    resource_name TEXT,
    namespace TEXT,
    operation TEXT NOT NULL,
    status TEXT NOT NULL,
    detail TEXT,
    request_ip TEXT,
    user_agent TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Per-principal time ordering for display and compliance review.
pub const CREATE_OPERATION_LOGS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS operation_logs_user_created_idx
    ON operation_logs (user_id, created_at)
"#;

pub const CREATE_SYSTEM_SETTINGS: &str = r#"
CREATE TABLE IF NOT EXISTS system_settings (
    id UUID PRIMARY KEY,
    category TEXT NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (category, name)
)
"#;

/// Create all tables and indexes if they do not exist. Idempotent.
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for ddl in [
        CREATE_USERS,
        CREATE_CLUSTERS,
        CREATE_PERMISSIONS,
        CREATE_OPERATION_LOGS,
        CREATE_OPERATION_LOGS_INDEX,
        CREATE_SYSTEM_SETTINGS,
    ] {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}
