//! `helmgate-core` — shared foundation for the authorization engine.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the scope value object, and the error taxonomy
//! every other crate maps into.

pub mod error;
pub mod id;
pub mod scope;

pub use error::{AuthError, AuthResult};
pub use id::{ClusterId, UserId};
pub use scope::Scope;
