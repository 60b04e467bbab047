//! Effective role of a principal within a scope.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Permission level a principal holds within a (cluster, namespace) scope.
///
/// This is a closed set: adding a role is a compile-time exhaustiveness gap
/// in [`crate::PolicyTable::can_perform`], not a silently-missed branch.
/// `None` is the implicit-deny role returned when no assignment matches.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Dev,
    Ops,
    #[serde(rename = "readonly")]
    ReadOnly,
    None,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Dev => "dev",
            Role::Ops => "ops",
            Role::ReadOnly => "readonly",
            Role::None => "none",
        }
    }

    /// Map a stored role string to a role, treating anything unrecognized as
    /// `None` (deny-all). Used when reading rows written by other versions.
    pub fn from_stored(s: &str) -> Role {
        s.parse().unwrap_or(Role::None)
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "dev" => Ok(Role::Dev),
            "ops" => Ok(Role::Ops),
            "readonly" => Ok(Role::ReadOnly),
            "none" => Ok(Role::None),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
