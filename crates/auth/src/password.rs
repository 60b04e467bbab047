//! Password hashing and verification (Argon2id, PHC format).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use tracing::warn;

use helmgate_core::{AuthError, AuthResult};

/// Hash a plaintext password for storage in `users.password_hash`.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::storage(format!("password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// A malformed stored hash is treated as a mismatch (fail closed) and logged;
/// it should never grant access.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match argon2::PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed; rejecting login");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
