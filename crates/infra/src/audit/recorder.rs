//! Fire-and-forget audit recording.
//!
//! The request path hands decisions to a bounded channel with `try_send` and
//! moves on; a single background writer drains the channel into the audit
//! store. A slow or unavailable store therefore never backpressures an
//! authorization check — the recorder retries a failed write once, then
//! drops the record with a logged warning. The single writer also gives
//! per-principal monotonic ordering of rows for free.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use helmgate_auth::Action;
use helmgate_core::{ClusterId, UserId};

use super::store::{AuditStore, OperationLogRow};

/// Outcome of an evaluated authorization decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    Allowed,
    Denied,
}

impl DecisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::Allowed => "allowed",
            DecisionOutcome::Denied => "denied",
        }
    }
}

/// The in-flight evaluation context, projected into an `operation_logs` row
/// on completion. Ephemeral — never persisted directly.
#[derive(Debug, Clone)]
pub struct ActionDecision {
    pub user_id: UserId,
    pub username: String,
    pub cluster_id: Option<ClusterId>,
    pub cluster_name: Option<String>,
    pub action: Action,
    pub resource_name: Option<String>,
    pub namespace: Option<String>,
    pub outcome: DecisionOutcome,
    pub detail: Option<String>,
    pub request_ip: Option<String>,
    pub user_agent: Option<String>,
    pub decided_at: DateTime<Utc>,
}

impl ActionDecision {
    fn into_row(self) -> OperationLogRow {
        OperationLogRow {
            id: Uuid::now_v7(),
            user_id: self.user_id,
            username: self.username,
            cluster_id: self.cluster_id,
            cluster_name: self.cluster_name,
            resource_type: self
                .action
                .resource
                .map(|k| k.as_str().to_string())
                .unwrap_or_default(),
            resource_name: self.resource_name,
            namespace: self.namespace,
            operation: self.action.to_string(),
            status: self.outcome.as_str().to_string(),
            detail: self.detail,
            request_ip: self.request_ip,
            user_agent: self.user_agent,
            created_at: self.decided_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Channel capacity; when full, new records are dropped, not awaited.
    pub buffer: usize,
    /// Record read-only actions too (mutating actions are always recorded).
    pub record_reads: bool,
    /// Delay before the single retry of a failed append.
    pub retry_delay: Duration,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            buffer: 1024,
            record_reads: false,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Cheap, cloneable handle used on the request path.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    tx: mpsc::Sender<ActionDecision>,
    record_reads: bool,
}

impl AuditRecorder {
    /// Hand a decision to the writer. Never blocks, never fails the caller.
    pub fn record(&self, decision: ActionDecision) {
        if decision.action.is_read() && !self.record_reads {
            return;
        }

        if let Err(e) = self.tx.try_send(decision) {
            // Buffer full or writer gone. The decision itself stands.
            warn!(error = %e, "audit buffer unavailable; dropping record");
        }
    }
}

/// Spawn the background writer and return the request-path handle.
///
/// The writer exits once every `AuditRecorder` clone has been dropped and
/// the channel is drained; await the returned handle for a clean shutdown.
pub fn spawn_recorder(
    store: Arc<dyn AuditStore>,
    config: RecorderConfig,
) -> (AuditRecorder, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.buffer);
    let retry_delay = config.retry_delay;
    let handle = tokio::spawn(writer_loop(store, rx, retry_delay));

    (
        AuditRecorder {
            tx,
            record_reads: config.record_reads,
        },
        handle,
    )
}

async fn writer_loop(
    store: Arc<dyn AuditStore>,
    mut rx: mpsc::Receiver<ActionDecision>,
    retry_delay: Duration,
) {
    while let Some(decision) = rx.recv().await {
        let row = decision.into_row();
        if let Err(first) = store.append(&row).await {
            debug!(error = %first, "audit append failed; retrying once");
            tokio::time::sleep(retry_delay).await;
            if let Err(second) = store.append(&row).await {
                warn!(
                    error = %second,
                    operation = %row.operation,
                    user = %row.user_id,
                    "audit append failed after retry; dropping record"
                );
            }
        }
    }
}
