//! Infrastructure layer: storage adapters and the audit pipeline.
//!
//! Every store comes in two flavors behind the same trait: a Postgres (sqlx)
//! implementation for production and an in-memory implementation for
//! tests/dev wiring.

pub mod audit;
pub mod schema;
pub mod stores;

#[cfg(test)]
mod integration_tests;

pub use audit::{
    ActionDecision, AuditRecorder, AuditStore, DecisionOutcome, InMemoryAuditStore,
    OperationLogRow, PostgresAuditStore, RecorderConfig, spawn_recorder,
};
pub use stores::cluster::{ClusterRef, ClusterStore, InMemoryClusterStore, PostgresClusterStore};
pub use stores::permission::{InMemoryPermissionStore, PostgresPermissionStore};
pub use stores::settings::{InMemorySettingsStore, PostgresSettingsStore, SettingsStore};
pub use stores::user::{InMemoryUserStore, PostgresUserStore};
