//! Observability: logging/tracing initialization for the engine.

pub mod tracing;

pub use tracing::init;
