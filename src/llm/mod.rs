//! LLM client and the tool-calling loop
//!
//! - [`LLMClient`] - The chat-completion trait the loop is written against
//! - [`OpenAIClient`] - `reqwest` client for OpenAI-compatible APIs
//! - [`ToolCoordinator`] - Drives a conversation through rounds of tool calls
//!
//! # Example
//!
//! ```ignore
//! use shopkeep::llm::{OpenAIClient, ToolCoordinator};
//!
//! let client = Arc::new(OpenAIClient::from_config(&config.llm)?);
//! let coordinator = ToolCoordinator::new(client, registry, (&config.agent).into());
//! let result = coordinator.execute(messages).await?;
//! println!("{}", result.message.content);
//! ```

/// Core LLM client trait and response types.
pub mod client;
/// Multi-round tool calling.
pub mod coordinator;
/// OpenAI chat-completions client.
pub mod openai;

pub use client::{LLMClient, LLMResponse, TokenUsage};
pub use coordinator::{CoordinatorResult, FinishReason, ToolCallingConfig, ToolCoordinator};
pub use openai::OpenAIClient;
