//! Authorization error taxonomy.

use thiserror::Error;

/// Result type used across the authorization engine.
pub type AuthResult<T> = Result<T, AuthError>;

/// Engine-level error.
///
/// Denials are ordinary values of this type, never panics. The variants are
/// chosen so callers can distinguish "you may not do this" (`Unauthorized`)
/// from "we could not determine whether you may" (`StorageUnavailable`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing, malformed, or expired credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Correct identity, wrong secret at login or password change.
    #[error("invalid credential")]
    InvalidCredential,

    /// Valid identity, but the policy denies the action. Always fail-closed.
    #[error("forbidden: {0}")]
    Unauthorized(String),

    /// Referenced cluster/namespace does not exist (or is soft-deleted).
    /// Treated as a deny so resource existence is not disclosed.
    #[error("scope not found")]
    ScopeNotFound,

    /// The permission or audit store could not be reached in time.
    /// The check fails closed; callers may retry.
    #[error("authorization store unavailable: {0}")]
    StorageUnavailable(String),
}

impl AuthError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn unauthorized(action: impl Into<String>) -> Self {
        Self::Unauthorized(action.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Whether the caller may usefully retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}
