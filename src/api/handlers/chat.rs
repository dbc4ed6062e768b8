use crate::{
    llm::coordinator::ToolCoordinator,
    tools::ToolRegistry,
    types::{AppError, ChatRequest, ChatResponse, Message, MessageRole, Result},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub const AGENT_SYSTEM_PROMPT: &str =
    "You are a pragmatic AI assistant. Use tools when helpful. Always finish with \"Final Answer:\".";

pub const RETAIL_SYSTEM_PROMPT: &str = "You are a senior retail analytics assistant. Use sales, inventory, and pricing tools; then return a concise markdown report with Final Answer.";

/// General assistant with calculator and FAQ tools.
pub async fn agent_chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let tools = state.general_tools.clone();
    run_chat(state, "agent", AGENT_SYSTEM_PROMPT, tools, payload).await
}

/// Retail analytics assistant with the full retail tool set.
pub async fn retail_chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let tools = state.retail_tools.clone();
    run_chat(state, "retail", RETAIL_SYSTEM_PROMPT, tools, payload).await
}

async fn run_chat(
    state: AppState,
    endpoint: &'static str,
    system_prompt: &str,
    tools: Arc<ToolRegistry>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id, endpoint);

    async move {
        let Json(request) =
            payload.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        validate_conversation(&request.messages)?;

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(Message::system(system_prompt));
        messages.extend(request.messages);

        let coordinator = ToolCoordinator::new(state.llm.clone(), tools, state.tool_calling_config());
        let result = coordinator.execute(messages).await.map_err(|e| {
            error!(error = %e, "chat failed");
            e
        })?;

        info!(
            iterations = result.iterations,
            tool_calls = result.tool_calls.len(),
            finish_reason = %result.finish_reason,
            "chat completed"
        );

        Ok(Json(ChatResponse {
            message: result.message,
            finish_reason: result.finish_reason,
            iterations: result.iterations,
        }))
    }
    .instrument(span)
    .await
}

/// Every `tool` message must answer a call id issued by an earlier assistant turn.
pub fn validate_conversation(messages: &[Message]) -> Result<()> {
    let mut issued: HashSet<&str> = HashSet::new();

    for (index, message) in messages.iter().enumerate() {
        match message.role {
            MessageRole::Assistant => {
                issued.extend(message.tool_calls.iter().map(|call| call.id.as_str()));
            }
            MessageRole::Tool => {
                let id = message.tool_call_id.as_deref().ok_or_else(|| {
                    AppError::InvalidInput(format!("messages[{}]: tool message without tool_call_id", index))
                })?;
                if !issued.contains(id) {
                    return Err(AppError::InvalidInput(format!(
                        "messages[{}]: tool_call_id '{}' does not match an earlier assistant tool call",
                        index, id
                    )));
                }
            }
            MessageRole::System | MessageRole::User => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolCall;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: "calculator".to_string(),
            arguments: "{}".to_string(),
        }
    }

    #[test]
    fn test_plain_conversation_is_valid() {
        let messages = vec![Message::system("extra rules"), Message::user("hi")];
        assert!(validate_conversation(&messages).is_ok());
        assert!(validate_conversation(&[]).is_ok());
    }

    #[test]
    fn test_tool_message_must_follow_its_call() {
        let valid = vec![
            Message::user("2+2?"),
            Message::assistant_with_tool_calls("", vec![call("c1")]),
            Message::tool_result("c1", "calculator", "4"),
        ];
        assert!(validate_conversation(&valid).is_ok());

        let orphan = vec![
            Message::user("2+2?"),
            Message::tool_result("c1", "calculator", "4"),
            Message::assistant_with_tool_calls("", vec![call("c1")]),
        ];
        let err = validate_conversation(&orphan).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(err.to_string().contains("messages[1]"));
    }

    #[test]
    fn test_tool_message_without_id_is_rejected() {
        let mut msg = Message::tool_result("c1", "calculator", "4");
        msg.tool_call_id = None;
        assert!(validate_conversation(&[msg]).is_err());
    }
}
