//! API request handlers.

/// Chat endpoints that run the tool loop.
pub mod chat;
/// Liveness probe.
pub mod health;
