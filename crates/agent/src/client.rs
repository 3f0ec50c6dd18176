//! HTTP client for the healthcare REST API.
//!
//! One pooled `reqwest::Client` is shared by every tool. Failures of any kind come back as a
//! [`ClientError`] value so tools can describe them instead of aborting the conversation.

use crate::error::ClientError;
use api_shared::{ErrorBody, HealthRes, HealthService};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{redirect, Method, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

const MAX_REDIRECTS: usize = 10;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client rooted at `base_url` (for example `http://localhost:8000/api/v2`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> ClientResult<Value> {
        let request = self.http.get(self.url(path)).query(params);
        self.send_json(Method::GET, path, request).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> ClientResult<Value> {
        let request = self.http.post(self.url(path)).json(body);
        self.send_json(Method::POST, path, request).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> ClientResult<Value> {
        let request = self.http.put(self.url(path)).json(body);
        self.send_json(Method::PUT, path, request).await
    }

    /// Delete a resource; success carries no body so a small acknowledgement is returned.
    pub async fn delete(&self, path: &str) -> ClientResult<Value> {
        let response = self.send(Method::DELETE, path, self.http.delete(self.url(path))).await?;
        Ok(json!({"success": true, "status_code": response.status().as_u16()}))
    }

    /// Fetch `/health`; a payload that does not report `ok` is an error.
    pub async fn health(&self) -> ClientResult<HealthRes> {
        let value = self.get("/health", &[]).await?;
        health_from_value(value).inspect_err(|e| {
            tracing::error!("Unhealthy response from {}: {}", self.base_url, e);
        })
    }

    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("{} request failed for {}{}: {}", method, self.base_url, path, e);
            ClientError::new(e.to_string(), e.status().map(|s| s.as_u16()))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => err.detail,
            Err(_) if body.trim().is_empty() => status.to_string(),
            Err(_) => format!("{status}: {}", body.trim()),
        };
        tracing::warn!(
            "{} {}{} returned {}: {}",
            method,
            self.base_url,
            path,
            status.as_u16(),
            message
        );
        Err(ClientError::new(message, Some(status.as_u16())))
    }

    async fn send_json(&self, method: Method, path: &str, request: RequestBuilder) -> ClientResult<Value> {
        let response = self.send(method.clone(), path, request).await?;
        let status = response.status().as_u16();
        response.json::<Value>().await.map_err(|e| {
            tracing::error!("{} {}{} returned invalid JSON: {}", method, self.base_url, path, e);
            ClientError::new(format!("invalid JSON response: {e}"), Some(status))
        })
    }
}

fn health_from_value(value: Value) -> ClientResult<HealthRes> {
    let health: HealthRes = serde_json::from_value(value)
        .map_err(|e| ClientError::new(format!("unexpected health payload: {e}"), None))?;
    if !HealthService::is_healthy(&health) {
        return Err(ClientError::new(
            format!("API reported status {:?}", health.status),
            None,
        ));
    }
    Ok(health)
}
