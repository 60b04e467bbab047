//! Request-scoped principal context.
//!
//! The verified identity travels explicitly with the request (as an axum
//! extension) rather than through any ambient global; handlers receive it
//! as a parameter.

use chrono::{DateTime, Utc};

use helmgate_auth::VerifiedSession;
use helmgate_core::UserId;

/// Authenticated identity for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    username: String,
    platform_admin: bool,
    expires_at: DateTime<Utc>,
}

impl PrincipalContext {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn platform_admin(&self) -> bool {
        self.platform_admin
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl From<VerifiedSession> for PrincipalContext {
    fn from(session: VerifiedSession) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username,
            platform_admin: session.platform_admin,
            expires_at: session.expires_at,
        }
    }
}
