//! Configuration utilities.

/// TOML + environment configuration loaded at startup.
pub mod config;
