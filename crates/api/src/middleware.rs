//! Bearer authentication middleware.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use helmgate_core::{AuthError, AuthResult};

use crate::context::PrincipalContext;
use crate::error::ApiError;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const CHANGE_PASSWORD_PATH: &str = "/api/v1/auth/password";

/// Operations whose authentication failures must reach the caller raw,
/// without the clear-session-and-redirect behavior. An expired token on
/// these paths must not knock out an unrelated valid session.
pub fn is_exempt(path: &str) -> bool {
    path == LOGIN_PATH || path == CHANGE_PASSWORD_PATH
}

/// Verify the bearer token and attach the principal to the request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let exempt = is_exempt(req.uri().path());

    match extract_bearer(req.headers()).and_then(|token| state.verifier.verify(token)) {
        Ok(session) => {
            req.extensions_mut()
                .insert(PrincipalContext::from(session));
            next.run(req).await
        }
        Err(error) => ApiError::new(error, exempt).into_response(),
    }
}

fn extract_bearer(headers: &HeaderMap) -> AuthResult<&str> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AuthError::unauthenticated("missing Authorization header"))?;

    let header = header
        .to_str()
        .map_err(|_| AuthError::unauthenticated("malformed Authorization header"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::unauthenticated("expected Bearer credential"))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::unauthenticated("empty bearer token"));
    }

    Ok(token)
}
