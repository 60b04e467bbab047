//! Mapping of engine errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use helmgate_core::AuthError;

/// An engine error plus whether the failing operation is on the
/// session-reset exemption list (login, password change).
///
/// On exempted operations the caller gets the raw failure to render inline;
/// everywhere else an `Unauthenticated` failure also instructs the client to
/// clear its session.
#[derive(Debug)]
pub struct ApiError {
    error: AuthError,
    exempt: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    session_reset: bool,
    retryable: bool,
}

impl ApiError {
    pub fn new(error: AuthError, exempt: bool) -> Self {
        Self { error, exempt }
    }

    /// Failure on an exempted operation: never triggers a session reset.
    pub fn exempt(error: AuthError) -> Self {
        Self::new(error, true)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        Self::new(error, false)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.error {
            AuthError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AuthError::InvalidCredential => (StatusCode::UNAUTHORIZED, "invalid_credential"),
            AuthError::Unauthorized(_) => (StatusCode::FORBIDDEN, "forbidden"),
            // Masked: an unauthorized caller learns nothing about whether
            // the cluster exists.
            AuthError::ScopeNotFound => (StatusCode::FORBIDDEN, "forbidden"),
            AuthError::StorageUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
        };

        let message = match &self.error {
            AuthError::ScopeNotFound => "forbidden".to_string(),
            other => other.to_string(),
        };

        let body = ErrorBody {
            code,
            message,
            session_reset: matches!(self.error, AuthError::Unauthenticated(_)) && !self.exempt,
            retryable: self.error.is_retryable(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_resets_session_only_off_the_exemption_list() {
        let plain = ApiError::from(AuthError::unauthenticated("token expired"));
        let exempt = ApiError::exempt(AuthError::unauthenticated("token expired"));

        assert!(!plain.exempt);
        assert!(exempt.exempt);
    }
}
