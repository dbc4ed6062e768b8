//! Mock implementations for testing.
//!
//! `MockLLMClient` replays a script of responses and records every
//! conversation it was sent, so tests can drive the tool loop without a
//! network and then inspect what the model would have seen.

use async_trait::async_trait;
use shopkeep::data::{DataSources, FaqEntry, InventoryRecord, SalesRecord};
use shopkeep::llm::{LLMClient, LLMResponse};
use shopkeep::types::{AppError, Message, Result, ToolCall, ToolDefinition};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock LLM client with scripted responses.
///
/// When the script runs out the last response is repeated, so a single
/// tool-calling response produces a model that never stops calling tools.
pub struct MockLLMClient {
    script: Mutex<VecDeque<LLMResponse>>,
    last: LLMResponse,
    should_fail: bool,
    requests: Mutex<Vec<Vec<Message>>>,
    offered_tools: Mutex<Vec<Vec<String>>>,
}

impl MockLLMClient {
    /// Create a mock that plays `responses` in order.
    pub fn scripted(responses: Vec<LLMResponse>) -> Self {
        let last = responses.last().cloned().unwrap_or_default();
        Self {
            script: Mutex::new(responses.into()),
            last,
            should_fail: false,
            requests: Mutex::new(Vec::new()),
            offered_tools: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that answers once with plain text.
    pub fn new(response: &str) -> Self {
        Self::scripted(vec![LLMResponse::text(response)])
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::scripted(Vec::new())
        }
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Conversations sent to the model, one per round.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    /// Tool names offered on each round.
    pub fn offered_tools(&self) -> Vec<Vec<String>> {
        self.offered_tools.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn chat(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<LLMResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.offered_tools
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.name.clone()).collect());

        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }

        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.last.clone()))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Build a tool call with JSON-encoded arguments.
pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

/// Small in-memory data set shared by the integration tests.
pub fn sample_sources() -> DataSources {
    DataSources::in_memory(
        vec![
            FaqEntry::new("How do I reset my password?", "Open Settings and choose Reset password."),
            FaqEntry::new("What is the return policy?", "Returns are accepted within 30 days."),
        ],
        vec![
            SalesRecord::new("2024-01-02", "o1", "SKU-A", "toys", 10.0, 2.0),
            SalesRecord::new("2024-01-03", "o1", "SKU-B", "games", 40.0, 1.0),
            SalesRecord::new("2024-01-10", "o2", "SKU-A", "toys", 10.0, 4.0),
            SalesRecord::new("2024-02-01", "o3", "SKU-C", "books", 8.0, 3.0),
        ],
        vec![
            InventoryRecord::new("SKU-A", "toys", 10.0, 2, 5),
            InventoryRecord::new("SKU-B", "games", 40.0, 9, 3),
            InventoryRecord::new("SKU-C", "books", 8.0, 4, 4),
        ],
    )
}
