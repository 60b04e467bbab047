//! Shared application state handed to every handler.

use std::sync::Arc;

use helmgate_auth::{CredentialStore, PermissionStore, PolicyTable, SessionVerifier};
use helmgate_infra::{AuditRecorder, ClusterStore, SettingsStore};

/// Everything a request needs, behind cheap clones.
///
/// All stores are trait objects so tests and dev wiring can swap the
/// Postgres adapters for the in-memory ones.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SessionVerifier>,
    pub users: Arc<dyn CredentialStore>,
    pub permissions: Arc<dyn PermissionStore>,
    pub clusters: Arc<dyn ClusterStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub policy: Arc<PolicyTable>,
    pub audit: AuditRecorder,
}
