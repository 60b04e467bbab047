//! Bearer-token issuance and verification.
//!
//! Tokens are HS256 JWTs that embed the principal identity, the
//! platform-admin flag, and the expiry. Verification is purely stateless:
//! there is no server-side session table and no revocation list, so a
//! compromised token stays valid until its natural expiry. That is a
//! recorded scalability trade-off, not an accident.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use helmgate_core::{AuthError, AuthResult, UserId};

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — user ID (UUID string).
    pub sub: String,
    /// Username, for audit rows without a user lookup.
    pub username: String,
    /// Platform-admin bypass flag.
    pub admin: bool,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// A freshly minted token plus its expiry, returned by login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Proof that a presented token passed signature and expiry checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    pub user_id: UserId,
    pub username: String,
    pub platform_admin: bool,
    pub expires_at: DateTime<Utc>,
}

impl VerifiedSession {
    /// Remaining validity window at `now`.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }
}

/// HS256 signer/verifier over a shared secret.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a token valid for `ttl` starting at `issued_at`.
    pub fn issue(
        &self,
        user_id: UserId,
        username: &str,
        platform_admin: bool,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> AuthResult<IssuedToken> {
        let expires_at = issued_at + ttl;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            admin: platform_admin,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::unauthenticated(format!("token encode: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and expiry, returning the embedded identity.
    ///
    /// Expiry is checked with zero leeway: a token is invalid the second it
    /// expires.
    pub fn verify(&self, token: &str) -> AuthResult<VerifiedSession> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AuthError::unauthenticated("token expired")
                }
                _ => AuthError::unauthenticated("invalid token"),
            })?;

        let user_id: UserId = data
            .claims
            .sub
            .parse()
            .map_err(|_| AuthError::unauthenticated("invalid token subject"))?;

        let expires_at = Utc
            .timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or_else(|| AuthError::unauthenticated("invalid token expiry"))?;

        Ok(VerifiedSession {
            user_id,
            username: data.claims.username,
            platform_admin: data.claims.admin,
            expires_at,
        })
    }
}
