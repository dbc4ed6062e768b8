//! Tools the model can call during a chat
//!
//! # Module Structure
//!
//! - [`calculator`](crate::tools::calculator) - Arithmetic expression evaluation
//! - [`faq`](crate::tools::faq) - Keyword-overlap lookup in the FAQ list
//! - [`retail`](crate::tools::retail) - Sales summary, low stock and price optimization
//! - [`report`](crate::tools::report) - Markdown rendering of retail findings
//! - [`registry`](crate::tools::registry) - Tool registration and dispatch
//!
//! # Tool Registry
//!
//! ```ignore
//! let registry = ToolRegistry::retail(&sources, &config.tools);
//! let definitions = registry.get_tool_definitions();
//! let result = registry.execute("calculator", json!({"expression": "2+2"})).await?;
//! ```

/// Calculator tool for arithmetic operations.
pub mod calculator;
/// FAQ lookup over the curated question list.
pub mod faq;
/// Tool registry for managing available tools.
pub mod registry;
/// Markdown report assembly.
pub mod report;
/// Retail analytics tools.
pub mod retail;

pub use registry::{Tool, ToolRegistry};
