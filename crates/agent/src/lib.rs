//! # HC Agent
//!
//! Clinical assistant that answers questions by calling the healthcare REST API.
//!
//! - [`client::ApiClient`]: pooled HTTP client returning structured [`ClientError`] values
//! - [`sanitize`]: tool-argument cleaning
//! - [`tools::Toolbox`]: patient and encounter tools rendered as text
//! - [`llm`]: the [`llm::ChatModel`] seam and an OpenAI-compatible implementation
//! - [`agent::ClinicalAgent`]: the tool-calling loop

#![warn(rust_2018_idioms)]

pub mod agent;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod llm;
pub mod sanitize;
pub mod tools;

pub use agent::ClinicalAgent;
pub use client::ApiClient;
pub use config::{AgentConfig, AgentEnv};
pub use error::{AgentError, AgentResult, ClientError};
pub use llm::{ChatMessage, ChatModel, OpenAiCompatible};
pub use tools::Toolbox;

/// API client configured from `cfg`.
pub fn api_client(cfg: &AgentConfig) -> AgentResult<ApiClient> {
    ApiClient::new(cfg.api_base_url(), cfg.http_timeout()).map_err(AgentError::HttpClient)
}

/// Build the assistant backed by the configured OpenAI-compatible model.
pub async fn build_agent(cfg: &AgentConfig) -> AgentResult<ClinicalAgent<OpenAiCompatible>> {
    let model = OpenAiCompatible::new(cfg)?;
    let today = chrono::Local::now().date_naive();
    let instructions = agent::load_instructions(cfg.instructions_file(), today).await?;
    tracing::info!(
        "-- Clinical assistant using {} against {}",
        cfg.llm_model(),
        cfg.api_base_url()
    );
    Ok(ClinicalAgent::new(
        model,
        Toolbox::new(api_client(cfg)?),
        instructions,
        cfg.max_iterations(),
    ))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::ApiClient;
    use hc_core::Services;
    use std::time::Duration;

    /// Serve the real router over an in-memory database on an ephemeral port.
    pub(crate) async fn spawn_api() -> (ApiClient, Services) {
        let pool = hc_core::db::connect_in_memory()
            .await
            .expect("in-memory pool");
        let services = Services::new(pool);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(api_rest::serve(listener, services.clone()));

        let client = ApiClient::new(format!("http://{addr}/api/v2"), Duration::from_secs(5))
            .expect("client should build");
        (client, services)
    }

    #[tokio::test]
    async fn test_client_round_trip_and_errors() {
        let (client, _services) = spawn_api().await;

        let health = client.health().await.expect("health");
        assert_eq!(health.status, "ok");

        let missing = client
            .get("/patients/99", &[])
            .await
            .expect_err("patient 99 does not exist");
        assert_eq!(missing.status_code, Some(404));
        assert_eq!(missing.message, "Patient not found");

        let created = client
            .post(
                "/patients",
                &serde_json::json!({
                    "identifier": "MRN-5",
                    "first_name": "Mary",
                    "last_name": "Seacole",
                    "birth_date": "1805-11-23"
                }),
            )
            .await
            .expect("create patient");
        let id = created["id"].as_i64().expect("id");

        let updated = client
            .put(&format!("/patients/{id}"), &serde_json::json!({"city": "London"}))
            .await
            .expect("update patient");
        assert_eq!(updated["city"], "London");

        let deleted = client
            .delete(&format!("/patients/{id}"))
            .await
            .expect("delete patient");
        assert_eq!(deleted, serde_json::json!({"success": true, "status_code": 204}));

        let invalid = client
            .post("/conditions", &serde_json::json!({"patient_id": id, "code": "x"}))
            .await
            .expect_err("patient is gone");
        assert_eq!(invalid.status_code, Some(422));
        assert!(invalid.message.contains("patient_id"), "{}", invalid.message);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_a_value() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let client = ApiClient::new(format!("http://{addr}/api/v2"), Duration::from_secs(2))
            .expect("client should build");
        let err = client.get("/patients", &[]).await.expect_err("nothing listens");
        assert_eq!(err.status_code, None);
        assert_eq!(err.to_json()["status_code"], serde_json::Value::Null);
    }
}
