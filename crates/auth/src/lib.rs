//! `helmgate-auth` — pure authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage. Storage is
//! reached only through the `PermissionStore`/`CredentialStore` traits, which
//! `helmgate-infra` implements.

pub mod action;
pub mod password;
pub mod policy;
pub mod resolver;
pub mod role;
pub mod token;
pub mod verifier;

pub use action::{Action, ActionParseError, ResourceKind, Verb};
pub use policy::PolicyTable;
pub use resolver::{PermissionStore, resolve_role};
pub use role::Role;
pub use token::{IssuedToken, SessionClaims, TokenSigner, VerifiedSession};
pub use verifier::{CredentialStore, SessionVerifier, UserRecord};
