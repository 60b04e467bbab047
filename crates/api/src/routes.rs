//! Route handlers.

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use helmgate_auth::{Action, IssuedToken, Role};
use helmgate_core::{AuthError, ClusterId};
use helmgate_infra::stores::settings;

use crate::context::PrincipalContext;
use crate::error::ApiError;
use crate::guard::{self, ActionRequest, RequestOrigin};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Credential issuance. On the session-reset exemption list: failures are
/// returned raw for inline rendering.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    let ttl = settings::session_timeout(state.settings.as_ref())
        .await
        .map_err(ApiError::exempt)?;

    let issued = state
        .verifier
        .login(state.users.as_ref(), &body.username, &body.password, ttl)
        .await
        .map_err(ApiError::exempt)?;

    Ok(Json(issued))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Self-service credential change. Also on the exemption list.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .verifier
        .change_password(
            state.users.as_ref(),
            principal.user_id(),
            &body.current_password,
            &body.new_password,
        )
        .await
        .map_err(ApiError::exempt)?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub cluster_id: ClusterId,
    pub namespace: Option<String>,
    pub resource_name: Option<String>,
    /// `"<resourceType>:<verb>"` or a bare read verb.
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub allowed: bool,
    pub role: Role,
}

/// The authoritative enforcement endpoint.
pub async fn authorize(
    State(state): State<AppState>,
    Extension(principal): Extension<PrincipalContext>,
    headers: HeaderMap,
    Json(body): Json<AuthorizeRequest>,
) -> Result<Json<AuthorizeResponse>, ApiError> {
    // Anything outside the taxonomy is denied at the edge.
    let action = Action::parse(&body.action)
        .map_err(|e| ApiError::from(AuthError::unauthorized(e.to_string())))?;

    let origin = RequestOrigin::from_headers(&headers);
    let role = guard::authorize_action(
        &state,
        &principal,
        ActionRequest {
            cluster_id: body.cluster_id,
            namespace: body.namespace,
            resource_name: body.resource_name,
            action,
        },
        origin,
    )
    .await?;

    Ok(Json(AuthorizeResponse {
        allowed: true,
        role,
    }))
}
