//! The clinical assistant loop.

use crate::error::{AgentError, AgentResult};
use crate::llm::{ChatMessage, ChatModel, ToolCall};
use crate::tools::Toolbox;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::path::Path;

pub const FALLBACK_INSTRUCTIONS: &str =
    "You are a helpful clinical assistant. Assume today's date is {{CURRENT_DATE}}.";

const TOOL_GUIDANCE: &str = "\
You help healthcare professionals access patient information through the available tools.
Summarise tool results in natural, conversational language rather than repeating raw headings.

When calling tools:
- Pass bare values: patient_identifier=2, not patient_identifier=\"2\" or patient_identifier=\"patient_identifier=2\".
- A single name such as Robert854 goes in first_name only; use last_name only when both parts are given.
- Pass each parameter separately instead of concatenating several into one string.";

const OUT_OF_STEPS: &str = "You have used all available tool calls. \
Answer the original question using only the information gathered so far.";

/// Load system instructions, falling back to a short default when the file is absent.
///
/// `{{CURRENT_DATE}}` is replaced with `today` and tool-argument guidance is appended.
pub async fn load_instructions(path: &Path, today: NaiveDate) -> AgentResult<String> {
    let template = if tokio::fs::try_exists(path).await.unwrap_or(false) {
        tokio::fs::read_to_string(path)
            .await
            .map_err(AgentError::Instructions)?
    } else {
        tracing::debug!("No instructions at {}, using fallback", path.display());
        FALLBACK_INSTRUCTIONS.to_string()
    };

    let instructions = template.replace("{{CURRENT_DATE}}", &today.format("%Y-%m-%d").to_string());
    Ok(format!("{}\n\n{}", instructions.trim_end(), TOOL_GUIDANCE))
}

/// Tool-call arguments; JSON that does not parse to an object is handed over as a raw string.
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(Value::String(inner)) => Value::String(inner),
        _ => Value::String(raw.to_string()),
    }
}

pub struct ClinicalAgent<M> {
    model: M,
    toolbox: Toolbox,
    instructions: String,
    max_iterations: usize,
}

impl<M: ChatModel> ClinicalAgent<M> {
    pub fn new(model: M, toolbox: Toolbox, instructions: String, max_iterations: usize) -> Self {
        Self {
            model,
            toolbox,
            instructions,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    /// Answer one question with a fresh conversation.
    pub async fn ask(&self, question: &str) -> AgentResult<String> {
        let mut history = Vec::new();
        self.respond(&mut history, question).await
    }

    /// Answer `question` within an ongoing conversation, appending every turn to `history`.
    pub async fn respond(&self, history: &mut Vec<ChatMessage>, question: &str) -> AgentResult<String> {
        if history.is_empty() {
            history.push(ChatMessage::system(self.instructions.clone()));
        }
        history.push(ChatMessage::user(question));

        let specs = self.toolbox.specs();
        for step in 1..=self.max_iterations {
            let reply = self.model.complete(history, &specs).await?;
            let calls = match &reply {
                ChatMessage::Assistant { tool_calls, .. } => tool_calls.clone(),
                _ => Vec::new(),
            };
            history.push(reply.clone());

            if calls.is_empty() {
                return answer_text(reply);
            }

            tracing::debug!("Step {} of {}: {} tool call(s)", step, self.max_iterations, calls.len());
            for call in calls {
                let result = self.run_tool(&call).await;
                history.push(ChatMessage::Tool {
                    tool_call_id: call.id,
                    content: result,
                });
            }
        }

        tracing::info!(
            "Reached {} iterations without an answer, asking for a final response",
            self.max_iterations
        );
        history.push(ChatMessage::user(OUT_OF_STEPS));
        let reply = self.model.complete(history, &[]).await?;
        history.push(reply.clone());
        answer_text(reply)
    }

    async fn run_tool(&self, call: &ToolCall) -> String {
        let args = parse_arguments(&call.function.arguments);
        self.toolbox.call(&call.function.name, &args).await
    }
}

fn answer_text(reply: ChatMessage) -> AgentResult<String> {
    match reply {
        ChatMessage::Assistant {
            content: Some(text),
            ..
        } if !text.trim().is_empty() => Ok(text),
        _ => Err(AgentError::EmptyResponse),
    }
}
