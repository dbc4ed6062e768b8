//! # Shopkeep - tool-calling chat server
//!
//! An HTTP server that proxies chat turns to an OpenAI-compatible model and
//! lets the model call local tools: a calculator, an FAQ lookup, and retail
//! analytics (sales summary, low-stock report, price optimization, markdown
//! report) over CSV data.
//!
//! ## Overview
//!
//! Shopkeep can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `shopkeep-server` binary
//! 2. **As a library** - Drive the tool loop from your own code
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use shopkeep::{llm::{OpenAIClient, ToolCoordinator}, data::DataSources, ToolRegistry};
//! use shopkeep::types::Message;
//! use std::sync::Arc;
//!
//! let config = Config::load("shopkeep.toml")?;
//! let client = Arc::new(OpenAIClient::from_config(&config.llm)?);
//! let sources = DataSources::from_config(&config.data);
//! let registry = Arc::new(ToolRegistry::retail(&sources, &config.tools));
//!
//! let coordinator = ToolCoordinator::new(client, registry, (&config.agent).into());
//! let result = coordinator
//!     .execute(vec![Message::user("Which SKUs are low on stock?")])
//!     .await?;
//! println!("{}", result.message.content);
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`data`] - Sales, inventory and FAQ providers
//! - [`llm`] - LLM client and the tool-calling loop
//! - [`tools`] - Tool definitions and registry
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration

/// HTTP API handlers and routes.
pub mod api;
/// Command line parsing and terminal output.
pub mod cli;
/// Source tables for the tools.
pub mod data;
/// LLM client and tool coordination.
pub mod llm;
/// Built-in tools (calculator, FAQ, retail analytics).
pub mod tools;
/// Core types (messages, requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, LLMResponse, OpenAIClient, ToolCoordinator};
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Result};
pub use utils::config::Config;

use crate::data::DataSources;
use crate::llm::ToolCallingConfig;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Configuration, read once at startup
    pub config: Arc<Config>,
    /// Chat-completion backend
    pub llm: Arc<dyn LLMClient>,
    /// Calculator and FAQ lookup
    pub general_tools: Arc<ToolRegistry>,
    /// General tools plus the retail analytics tools
    pub retail_tools: Arc<ToolRegistry>,
}

impl AppState {
    /// Build state with file-backed data sources from `config.data`.
    pub fn new(config: Config, llm: Arc<dyn LLMClient>) -> Self {
        let sources = DataSources::from_config(&config.data);
        Self::with_sources(config, llm, sources)
    }

    /// Build state over explicit data sources.
    pub fn with_sources(config: Config, llm: Arc<dyn LLMClient>, sources: DataSources) -> Self {
        let general_tools = Arc::new(ToolRegistry::general(&sources, &config.tools));
        let retail_tools = Arc::new(ToolRegistry::retail(&sources, &config.tools));
        Self {
            config: Arc::new(config),
            llm,
            general_tools,
            retail_tools,
        }
    }

    /// Loop settings derived from `[agent]`.
    pub fn tool_calling_config(&self) -> ToolCallingConfig {
        ToolCallingConfig::from(&self.config.agent)
    }
}
