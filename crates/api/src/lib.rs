//! HTTP API: bearer middleware, the authorization guard, and the two
//! credential routes that are exempt from session-reset semantics.

pub mod app;
pub mod context;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::build_router;
pub use state::AppState;
