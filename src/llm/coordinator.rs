//! Tool-calling loop
//!
//! `ToolCoordinator` drives one conversation against an `LLMClient`:
//!
//! 1. Send the conversation with the available tools to the model
//! 2. If the model requests tool calls, execute them in order
//! 3. Append each result as a `tool` message tagged with the call id
//! 4. Repeat until the model answers without tools or the iteration cap is hit
//!
//! A failing or unknown tool never aborts the loop; its error text becomes the
//! tool message so the model can react. Only a failed model call is an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopkeep::llm::coordinator::{ToolCoordinator, ToolCallingConfig};
//!
//! let coordinator = ToolCoordinator::new(client, registry, ToolCallingConfig::default());
//! let result = coordinator.execute(vec![
//!     Message::system("You are a helpful assistant."),
//!     Message::user("What's 2 + 2?"),
//! ]).await?;
//!
//! println!("Response: {}", result.message.content);
//! println!("Tool calls made: {}", result.tool_calls.len());
//! ```

use crate::llm::client::{LLMClient, TokenUsage};
use crate::tools::registry::ToolRegistry;
use crate::types::{Message, Result, ToolCall};
use crate::utils::config::AgentConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Content of the synthetic assistant message returned when the cap is hit.
pub const MAX_ITERATIONS_MESSAGE: &str = "Stopped after max tool iterations.";

const TIMEOUT_MESSAGE: &str = "Tool execution timed out";

/// Configuration for tool calling coordination behavior.
#[derive(Debug, Clone)]
pub struct ToolCallingConfig {
    /// Maximum number of LLM iterations (not tool calls) before stopping.
    /// Each iteration is one round-trip to the LLM.
    pub max_iterations: usize,

    /// Timeout for individual tool execution.
    pub tool_timeout: Duration,
}

impl Default for ToolCallingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            tool_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&AgentConfig> for ToolCallingConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tool_timeout: Duration::from_secs(config.tool_timeout_secs),
        }
    }
}

/// Record of a single tool call execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Unique identifier for this tool call (from the LLM).
    pub id: String,
    /// Name of the tool that was called.
    pub name: String,
    /// Parsed arguments passed to the tool.
    pub arguments: Value,
    /// Text placed in the tool message.
    pub output: String,
    /// Whether the tool execution was successful.
    pub success: bool,
    /// Time taken to execute the tool in milliseconds.
    pub duration_ms: u64,
    /// Error message if the tool failed.
    pub error: Option<String>,
}

/// Reason why a tool coordination session ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Model answered without requesting tools.
    Stop,
    /// Hit the maximum iterations limit.
    MaxIterations,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::MaxIterations => write!(f, "max_iterations"),
        }
    }
}

/// Result of a complete tool coordination session.
#[derive(Debug, Clone)]
pub struct CoordinatorResult {
    /// Final assistant message, or the synthetic cap message.
    pub message: Message,

    /// All tool calls made during the session.
    pub tool_calls: Vec<ToolCallRecord>,

    /// Number of LLM iterations (round-trips) performed.
    pub iterations: usize,

    /// Why the session ended.
    pub finish_reason: FinishReason,

    /// Accumulated token usage across all iterations.
    pub total_usage: TokenUsage,

    /// Conversation as sent to the model on the last round, plus the final message.
    pub message_history: Vec<Message>,
}

/// Runs the tool loop for one conversation at a time.
///
/// The coordinator holds no per-conversation state, so one instance can serve
/// concurrent requests.
pub struct ToolCoordinator {
    client: Arc<dyn LLMClient>,
    registry: Arc<ToolRegistry>,
    config: ToolCallingConfig,
}

impl ToolCoordinator {
    pub fn new(
        client: Arc<dyn LLMClient>,
        registry: Arc<ToolRegistry>,
        config: ToolCallingConfig,
    ) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    /// Create a new ToolCoordinator with default configuration.
    pub fn with_defaults(client: Arc<dyn LLMClient>, registry: Arc<ToolRegistry>) -> Self {
        Self::new(client, registry, ToolCallingConfig::default())
    }

    /// Run the loop over `messages`, which should already carry any system
    /// prompt and prior turns.
    ///
    /// Returns an error only when the model call itself fails.
    pub async fn execute(&self, mut messages: Vec<Message>) -> Result<CoordinatorResult> {
        let tools = self.registry.get_tool_definitions();
        let mut all_tool_calls: Vec<ToolCallRecord> = Vec::new();
        let mut total_usage = TokenUsage::default();

        for iteration in 1..=self.config.max_iterations {
            debug!(
                iteration,
                messages = messages.len(),
                tools = tools.len(),
                "requesting completion"
            );

            let response = self.client.chat(&messages, &tools).await?;

            if let Some(usage) = &response.usage {
                total_usage = total_usage.add(usage);
            }

            if response.tool_calls.is_empty() {
                let message = Message::assistant(response.content);
                messages.push(message.clone());
                return Ok(CoordinatorResult {
                    message,
                    tool_calls: all_tool_calls,
                    iterations: iteration,
                    finish_reason: FinishReason::Stop,
                    total_usage,
                    message_history: messages,
                });
            }

            messages.push(Message::assistant_with_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let record = self.execute_single_tool(call).await;
                messages.push(Message::tool_result(&record.id, &record.name, &record.output));
                all_tool_calls.push(record);
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            tool_calls = all_tool_calls.len(),
            "tool loop hit iteration cap"
        );

        let message = Message::assistant(MAX_ITERATIONS_MESSAGE);
        messages.push(message.clone());
        Ok(CoordinatorResult {
            message,
            tool_calls: all_tool_calls,
            iterations: self.config.max_iterations,
            finish_reason: FinishReason::MaxIterations,
            total_usage,
            message_history: messages,
        })
    }

    /// Execute a single tool call with timeout. Failures are folded into the
    /// record's output text.
    async fn execute_single_tool(&self, call: &ToolCall) -> ToolCallRecord {
        let arguments = parse_arguments(call);
        let start = Instant::now();

        let result = timeout(
            self.config.tool_timeout,
            self.registry.execute(&call.name, arguments.clone()),
        )
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;

        let (output, error) = match result {
            Ok(Ok(value)) => (render_output(value), None),
            Ok(Err(e)) => (format!("Error: {}", e), Some(e.to_string())),
            Err(_) => (format!("Error: {}", TIMEOUT_MESSAGE), Some(TIMEOUT_MESSAGE.to_string())),
        };

        let success = error.is_none();
        if success {
            info!(tool = %call.name, call_id = %call.id, duration_ms, success, "tool executed");
        } else {
            warn!(
                tool = %call.name,
                call_id = %call.id,
                duration_ms,
                error = error.as_deref().unwrap_or_default(),
                "tool failed"
            );
        }

        ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments,
            output,
            success,
            duration_ms,
            error,
        }
    }
}

/// Parse the model's argument text. Absent or malformed arguments become `{}`.
fn parse_arguments(call: &ToolCall) -> Value {
    if call.arguments.trim().is_empty() {
        return Value::Object(Default::default());
    }
    match serde_json::from_str::<Value>(&call.arguments) {
        Ok(value) => value,
        Err(e) => {
            warn!(tool = %call.name, call_id = %call.id, error = %e, "unparseable tool arguments, using {{}}");
            Value::Object(Default::default())
        }
    }
}

/// Strings go to the model verbatim; anything else as compact JSON.
fn render_output(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::LLMResponse;
    use crate::types::{MessageRole, ToolDefinition};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses, repeating the last one when the script runs out.
    struct ScriptedClient {
        script: Mutex<VecDeque<LLMResponse>>,
        last: LLMResponse,
        calls: Mutex<usize>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<LLMResponse>) -> Self {
            let last = responses.last().cloned().unwrap_or_default();
            Self {
                script: Mutex::new(responses.into()),
                last,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        async fn chat(&self, _messages: &[Message], _tools: &[ToolDefinition]) -> Result<LLMResponse> {
            *self.calls.lock().unwrap() += 1;
            let next = self.script.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| self.last.clone()))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    fn coordinator(client: Arc<ScriptedClient>) -> ToolCoordinator {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(crate::tools::calculator::Calculator));
        ToolCoordinator::with_defaults(client, Arc::new(registry))
    }

    #[test]
    fn test_tool_calling_config_default() {
        let config = ToolCallingConfig::default();
        assert_eq!(config.max_iterations, 6);
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_from_agent_settings() {
        let agent = AgentConfig {
            max_iterations: 3,
            tool_timeout_secs: 5,
        };
        let config = ToolCallingConfig::from(&agent);
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.tool_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_finish_reason_display_and_serde() {
        assert_eq!(FinishReason::Stop.to_string(), "stop");
        assert_eq!(FinishReason::MaxIterations.to_string(), "max_iterations");
        assert_eq!(
            serde_json::to_value(FinishReason::MaxIterations).unwrap(),
            json!("max_iterations")
        );
    }

    #[test]
    fn test_parse_arguments_defaults_to_empty_object() {
        assert_eq!(parse_arguments(&call("1", "calculator", "")), json!({}));
        assert_eq!(parse_arguments(&call("1", "calculator", "{oops")), json!({}));
        assert_eq!(
            parse_arguments(&call("1", "calculator", r#"{"expression":"1+1"}"#)),
            json!({"expression": "1+1"})
        );
    }

    #[test]
    fn test_render_output() {
        assert_eq!(render_output(json!("2.8")), "2.8");
        assert_eq!(render_output(json!({"a": 1})), r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_final_answer_ends_after_one_round() {
        let client = Arc::new(ScriptedClient::new(vec![LLMResponse::text("Final Answer: hi")]));
        let result = coordinator(client.clone())
            .execute(vec![Message::user("hello")])
            .await
            .unwrap();

        assert_eq!(client.calls(), 1);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.finish_reason, FinishReason::Stop);
        assert_eq!(result.message, Message::assistant("Final Answer: hi"));
        assert!(result.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn test_tool_results_feed_next_round() {
        let client = Arc::new(ScriptedClient::new(vec![
            LLMResponse::with_tool_calls(
                "",
                vec![
                    call("call_a", "calculator", r#"{"expression":"(2+3*4)/5"}"#),
                    call("call_b", "calculator", r#"{"expression":"2+import"}"#),
                ],
            ),
            LLMResponse::text("Final Answer: 2.8"),
        ]));
        let result = coordinator(client.clone())
            .execute(vec![Message::user("compute")])
            .await
            .unwrap();

        assert_eq!(client.calls(), 2);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.tool_calls.len(), 2);

        let history = &result.message_history;
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].tool_calls.len(), 2);

        assert_eq!(history[2], Message::tool_result("call_a", "calculator", "2.8"));
        assert_eq!(history[3].tool_call_id.as_deref(), Some("call_b"));
        assert!(history[3].content.starts_with("Error: Invalid input"));
        assert!(!result.tool_calls[1].success);
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_tool_message() {
        let client = Arc::new(ScriptedClient::new(vec![
            LLMResponse::with_tool_calls("", vec![call("x1", "no_such_tool", "{}")]),
            LLMResponse::text("done"),
        ]));
        let result = coordinator(client)
            .execute(vec![Message::user("go")])
            .await
            .unwrap();

        let tool_msg = &result.message_history[2];
        assert_eq!(tool_msg.role, MessageRole::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("x1"));
        assert!(tool_msg.content.contains("Unknown tool: no_such_tool"));
        assert_eq!(result.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn test_always_calling_tools_stops_at_cap() {
        let client = Arc::new(ScriptedClient::new(vec![LLMResponse::with_tool_calls(
            "",
            vec![call("loop", "calculator", r#"{"expression":"1+1"}"#)],
        )]));
        let result = coordinator(client.clone())
            .execute(vec![Message::user("loop forever")])
            .await
            .unwrap();

        assert_eq!(client.calls(), 6);
        assert_eq!(result.iterations, 6);
        assert_eq!(result.finish_reason, FinishReason::MaxIterations);
        assert_eq!(result.message, Message::assistant(MAX_ITERATIONS_MESSAGE));
        assert_eq!(result.tool_calls.len(), 6);
    }

    struct SlowTool;

    #[async_trait]
    impl crate::tools::Tool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "Sleeps past any reasonable deadline"
        }

        fn parameters_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        async fn execute(&self, _args: Value) -> Result<Value> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(json!("too late"))
        }
    }

    #[tokio::test]
    async fn test_slow_tool_times_out() {
        let client = Arc::new(ScriptedClient::new(vec![
            LLMResponse::with_tool_calls("", vec![call("s1", "slow", "{}")]),
            LLMResponse::text("Final Answer: gave up"),
        ]));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SlowTool));
        let config = ToolCallingConfig {
            max_iterations: 6,
            tool_timeout: Duration::from_millis(100),
        };

        let result = ToolCoordinator::new(client, Arc::new(registry), config)
            .execute(vec![Message::user("wait")])
            .await
            .unwrap();

        let record = &result.tool_calls[0];
        assert!(!record.success);
        assert_eq!(record.output, "Error: Tool execution timed out");
        assert_eq!(
            result.message_history[2],
            Message::tool_result("s1", "slow", "Error: Tool execution timed out")
        );
        assert_eq!(result.finish_reason, FinishReason::Stop);
    }
}
