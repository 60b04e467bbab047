//! Session verification, login, and self-service password change.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument};

use helmgate_core::{AuthError, AuthResult, UserId};

use crate::password;
use crate::token::{IssuedToken, TokenSigner, VerifiedSession};

/// The slice of a user row the verifier needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    /// Global bypass flag (`users.role = 'admin'`).
    pub platform_admin: bool,
}

/// Credential-side view of the user store.
///
/// Only active, non-soft-deleted users are visible through this trait;
/// a disabled or deleted account behaves exactly like a wrong password.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_active_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>>;

    async fn find_active_by_id(&self, id: UserId) -> AuthResult<Option<UserRecord>>;

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> AuthResult<()>;

    async fn update_password_hash(&self, id: UserId, hash: &str) -> AuthResult<()>;
}

/// Stateless session verifier plus the two credential operations that are
/// exempt from session-reset semantics (login, password change).
pub struct SessionVerifier {
    signer: TokenSigner,
}

impl SessionVerifier {
    pub fn new(signer: TokenSigner) -> Self {
        Self { signer }
    }

    /// Validate a presented bearer token.
    ///
    /// Purely stateless: signature plus embedded expiry, no store lookup.
    pub fn verify(&self, token: &str) -> AuthResult<VerifiedSession> {
        self.signer.verify(token)
    }

    /// Verify a presented secret and mint a time-bounded session token.
    ///
    /// An unknown username and a wrong password are indistinguishable to the
    /// caller (`InvalidCredential`), so usernames cannot be enumerated.
    /// Successful login updates the user's last-authenticated timestamp.
    #[instrument(skip(self, store, password), fields(username = %username))]
    pub async fn login<S>(
        &self,
        store: &S,
        username: &str,
        password: &str,
        session_ttl: Duration,
    ) -> AuthResult<IssuedToken>
    where
        S: CredentialStore + ?Sized,
    {
        let user = store
            .find_active_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        if !password::verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredential);
        }

        let now = Utc::now();
        let issued = self
            .signer
            .issue(user.id, &user.username, user.platform_admin, now, session_ttl)?;
        store.touch_last_login(user.id, now).await?;

        info!(user_id = %user.id, "login succeeded");
        Ok(issued)
    }

    /// Change a principal's own password after re-verifying the current one.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn change_password<S>(
        &self,
        store: &S,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> AuthResult<()>
    where
        S: CredentialStore + ?Sized,
    {
        let user = store
            .find_active_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        if !password::verify_password(current, &user.password_hash) {
            return Err(AuthError::InvalidCredential);
        }

        let hash = password::hash_password(new)?;
        store.update_password_hash(user_id, &hash).await?;

        info!("password changed");
        Ok(())
    }
}
