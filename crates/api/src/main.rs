use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use helmgate_api::AppState;
use helmgate_auth::{PolicyTable, SessionVerifier, TokenSigner};
use helmgate_infra::{
    PostgresAuditStore, PostgresClusterStore, PostgresPermissionStore, PostgresSettingsStore,
    PostgresUserStore, RecorderConfig, schema, spawn_recorder,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    helmgate_observability::init();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });
    let record_reads = std::env::var("AUDIT_RECORD_READS")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;
    schema::apply_schema(&pool).await.context("failed to apply schema")?;

    let (audit, _writer) = spawn_recorder(
        Arc::new(PostgresAuditStore::new(pool.clone())),
        RecorderConfig {
            record_reads,
            ..RecorderConfig::default()
        },
    );

    let state = AppState {
        verifier: Arc::new(SessionVerifier::new(TokenSigner::new(jwt_secret.as_bytes()))),
        users: Arc::new(PostgresUserStore::new(pool.clone())),
        permissions: Arc::new(PostgresPermissionStore::new(pool.clone())),
        clusters: Arc::new(PostgresClusterStore::new(pool.clone())),
        settings: Arc::new(PostgresSettingsStore::new(pool)),
        policy: Arc::new(PolicyTable::default()),
        audit,
    };

    let app = helmgate_api::build_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .context("failed to bind 0.0.0.0:8080")?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
