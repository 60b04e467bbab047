//! Audit: durable, append-only record of every evaluated mutating action,
//! decoupled from the request path.

pub mod recorder;
pub mod store;

pub use recorder::{ActionDecision, AuditRecorder, DecisionOutcome, RecorderConfig, spawn_recorder};
pub use store::{AuditStore, InMemoryAuditStore, OperationLogRow, PostgresAuditStore};
