use serde_json::{json, Value};

/// Failure talking to the healthcare REST API.
///
/// Tools never propagate this further; they render it as a sentence for the model.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl ClientError {
    pub fn new(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    /// Render as the `{"error", "status_code"}` payload.
    pub fn to_json(&self) -> Value {
        json!({
            "error": self.message,
            "status_code": self.status_code,
        })
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no LLM API key configured (set LLM_API_KEY or GROQ_API_KEY)")]
    MissingApiKey,
    #[error("LLM request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("LLM returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("LLM response contained no choices")]
    EmptyResponse,
    #[error("failed to read instructions file: {0}")]
    Instructions(#[source] std::io::Error),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl From<reqwest::Error> for AgentError {
    fn from(e: reqwest::Error) -> Self {
        AgentError::Transport(e)
    }
}

pub type AgentResult<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_payload() {
        let err = ClientError::new("Patient not found", Some(404));
        assert_eq!(
            err.to_json(),
            json!({"error": "Patient not found", "status_code": 404})
        );
        assert!(err.is_not_found());

        let offline = ClientError::new("connection refused", None);
        assert_eq!(offline.to_json()["status_code"], Value::Null);
        assert!(!offline.is_not_found());
    }
}
