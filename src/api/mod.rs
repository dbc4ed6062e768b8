//! HTTP API Handlers and Routes
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! - `POST /api/agent/chat` - General assistant (calculator, FAQ)
//! - `POST /api/retail/chat` - Retail analytics assistant (sales, inventory, pricing, report)
//! - `GET /api/health` - Health check endpoint
//!
//! Both chat endpoints take `{"messages": [...]}` and answer with
//! `{"message": {...}, "finish_reason": "stop" | "max_iterations", "iterations": n}`.
//! Failures come back as `{"error": "..."}`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
