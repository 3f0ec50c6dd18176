//! Chat-completion models.

use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::tools::ToolSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One chat message in the OpenAI wire shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

/// `arguments` is JSON text as produced by the model; it is not guaranteed to parse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".into()
}

/// A chat model that may answer or request tool calls.
///
/// An empty `tools` slice means the model must answer in text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> AgentResult<ChatMessage>;
}

#[derive(Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// OpenAI-compatible `/chat/completions` endpoint (Groq by default).
#[derive(Clone, Debug)]
pub struct OpenAiCompatible {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl OpenAiCompatible {
    pub fn new(cfg: &AgentConfig) -> AgentResult<Self> {
        let api_key = cfg.llm_api_key().ok_or(AgentError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .timeout(cfg.http_timeout())
            .build()
            .map_err(AgentError::HttpClient)?;

        Ok(Self {
            http,
            base_url: cfg.llm_base_url().trim_end_matches('/').to_string(),
            model: cfg.llm_model().to_string(),
            api_key: api_key.to_string(),
            temperature: cfg.temperature(),
        })
    }

    fn request_body(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });
        if !tools.is_empty() {
            let functions: Vec<Value> = tools.iter().map(ToolSpec::to_function).collect();
            body["tools"] = Value::Array(functions);
            body["tool_choice"] = json!("auto");
        }
        body
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatible {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> AgentResult<ChatMessage> {
        tracing::debug!(
            "Calling {} with {} messages and {} tools",
            self.model,
            messages.len(),
            tools.len()
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(messages, tools))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("LLM returned {}: {}", status, body);
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: Completion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(AgentError::EmptyResponse)
    }
}
