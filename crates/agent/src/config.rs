//! Agent runtime configuration.
//!
//! Resolved once at startup from raw environment values, mirroring `hc_core::config`.

use crate::error::{AgentError, AgentResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v2";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_INSTRUCTIONS_FILE: &str = "agent/prompts/clinical_instructions.md";

/// Raw environment values, read once by the binary.
#[derive(Clone, Debug, Default)]
pub struct AgentEnv {
    pub api_base_url: Option<String>,
    pub http_timeout_secs: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub temperature: Option<String>,
    pub max_iterations: Option<String>,
    pub instructions_file: Option<String>,
}

impl AgentEnv {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            api_base_url: var("HC_API_BASE_URL"),
            http_timeout_secs: var("HC_HTTP_TIMEOUT_SECS"),
            llm_base_url: var("LLM_BASE_URL"),
            llm_model: var("LLM_MODEL"),
            llm_api_key: var("LLM_API_KEY"),
            groq_api_key: var("GROQ_API_KEY"),
            temperature: var("LLM_TEMPERATURE"),
            max_iterations: var("AGENT_MAX_ITERATIONS"),
            instructions_file: var("AGENT_INSTRUCTIONS_FILE"),
        }
    }
}

/// Agent configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    api_base_url: String,
    http_timeout: Duration,
    llm_base_url: String,
    llm_model: String,
    llm_api_key: Option<String>,
    temperature: f32,
    max_iterations: usize,
    instructions_file: PathBuf,
}

impl AgentConfig {
    /// Build an `AgentConfig` from raw environment values.
    pub fn from_env_values(env: AgentEnv) -> AgentResult<Self> {
        let timeout_secs = parse_or(
            "HC_HTTP_TIMEOUT_SECS",
            env.http_timeout_secs,
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(AgentError::InvalidConfig(
                "HC_HTTP_TIMEOUT_SECS must be at least 1".into(),
            ));
        }

        let temperature = parse_or("LLM_TEMPERATURE", env.temperature, DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AgentError::InvalidConfig(format!(
                "LLM_TEMPERATURE must be between 0 and 2, got {temperature}"
            )));
        }

        let max_iterations = parse_or(
            "AGENT_MAX_ITERATIONS",
            env.max_iterations,
            DEFAULT_MAX_ITERATIONS,
        )?;
        if max_iterations == 0 {
            return Err(AgentError::InvalidConfig(
                "AGENT_MAX_ITERATIONS must be at least 1".into(),
            ));
        }

        Ok(Self {
            api_base_url: or_default(env.api_base_url, DEFAULT_API_BASE_URL),
            http_timeout: Duration::from_secs(timeout_secs),
            llm_base_url: or_default(env.llm_base_url, DEFAULT_LLM_BASE_URL),
            llm_model: or_default(env.llm_model, DEFAULT_LLM_MODEL),
            llm_api_key: non_blank(env.llm_api_key).or_else(|| non_blank(env.groq_api_key)),
            temperature,
            max_iterations,
            instructions_file: PathBuf::from(or_default(
                env.instructions_file,
                DEFAULT_INSTRUCTIONS_FILE,
            )),
        })
    }

    /// Point the API client somewhere else (tests use an ephemeral port).
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn llm_base_url(&self) -> &str {
        &self.llm_base_url
    }

    pub fn llm_model(&self) -> &str {
        &self.llm_model
    }

    pub fn llm_api_key(&self) -> Option<&str> {
        self.llm_api_key.as_deref()
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn instructions_file(&self) -> &Path {
        &self.instructions_file
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    non_blank(value).unwrap_or_else(|| default.to_string())
}

fn parse_or<T: std::str::FromStr>(name: &str, value: Option<String>, default: T) -> AgentResult<T> {
    match non_blank(value) {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|_| AgentError::InvalidConfig(format!("{name} could not parse {v:?}"))),
    }
}
