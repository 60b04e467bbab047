//! Storage adapters: one module per persisted concern.

pub mod cluster;
pub mod permission;
pub mod settings;
pub mod user;

use helmgate_core::AuthError;

/// Map an sqlx failure into the engine's retryable infrastructure error.
///
/// The authorization check fails closed on these; they are reported to the
/// caller as a service error distinct from a deny.
pub(crate) fn map_sqlx_error(op: &str, e: sqlx::Error) -> AuthError {
    AuthError::storage(format!("{op}: {e}"))
}
