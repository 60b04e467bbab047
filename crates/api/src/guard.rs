//! The authorization guard: verify → scope → resolve → evaluate → record.
//!
//! Per request the check walks `Unauthenticated → Authenticated → Scoped →
//! Decided → (Recorded | RecordFailed-but-Decided-stands)`. The first three
//! stages are synchronous and block the caller; recording is fire-and-forget.
//! The decision itself is never retried, and once made it stands even if the
//! originating request is cancelled before the action executes.

use axum::http::HeaderMap;
use chrono::Utc;
use tracing::instrument;

use helmgate_auth::{Action, Role, resolve_role};
use helmgate_core::{AuthError, AuthResult, ClusterId};
use helmgate_infra::{ActionDecision, DecisionOutcome};

use crate::context::PrincipalContext;
use crate::state::AppState;

/// What the caller wants to do, and where.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub cluster_id: ClusterId,
    pub namespace: Option<String>,
    pub resource_name: Option<String>,
    pub action: Action,
}

/// Network origin of the request, for the audit trail.
#[derive(Debug, Clone, Default)]
pub struct RequestOrigin {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestOrigin {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let first_forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());

        let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            ip: first_forwarded,
            user_agent,
        }
    }
}

/// Decide whether the principal may perform the requested action.
///
/// Returns the resolved role on allow; a deny is `Unauthorized` (or the
/// masked `ScopeNotFound`). Either way the decision is handed to the audit
/// recorder before returning. Store failures propagate as
/// `StorageUnavailable` without producing a decision — fail closed, but
/// distinguishable from a deny.
#[instrument(skip_all, fields(user = %principal.user_id(), action = %request.action))]
pub async fn authorize_action(
    state: &AppState,
    principal: &PrincipalContext,
    request: ActionRequest,
    origin: RequestOrigin,
) -> AuthResult<Role> {
    let decided_at = Utc::now();

    let Some(cluster) = state.clusters.find_active(request.cluster_id).await? else {
        state.audit.record(decision(
            principal,
            &request,
            &origin,
            None,
            DecisionOutcome::Denied,
            Some("scope not found".to_string()),
            decided_at,
        ));
        return Err(AuthError::ScopeNotFound);
    };

    let role = resolve_role(
        state.permissions.as_ref(),
        principal.user_id(),
        principal.platform_admin(),
        request.cluster_id,
        request.namespace.as_deref(),
    )
    .await?;

    let allowed = state.policy.can_perform(role, &request.action);
    let outcome = if allowed {
        DecisionOutcome::Allowed
    } else {
        DecisionOutcome::Denied
    };

    state.audit.record(decision(
        principal,
        &request,
        &origin,
        Some(cluster.name),
        outcome,
        Some(format!("role={role}")),
        decided_at,
    ));

    if allowed {
        Ok(role)
    } else {
        Err(AuthError::unauthorized(request.action.to_string()))
    }
}

fn decision(
    principal: &PrincipalContext,
    request: &ActionRequest,
    origin: &RequestOrigin,
    cluster_name: Option<String>,
    outcome: DecisionOutcome,
    detail: Option<String>,
    decided_at: chrono::DateTime<Utc>,
) -> ActionDecision {
    ActionDecision {
        user_id: principal.user_id(),
        username: principal.username().to_string(),
        cluster_id: Some(request.cluster_id),
        cluster_name,
        action: request.action,
        resource_name: request.resource_name.clone(),
        namespace: request.namespace.clone(),
        outcome,
        detail,
        request_ip: origin.ip.clone(),
        user_agent: origin.user_agent.clone(),
        decided_at,
    }
}
