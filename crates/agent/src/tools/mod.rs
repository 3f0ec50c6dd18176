//! Tools exposed to the model.
//!
//! Every tool takes loosely-formed JSON arguments, cleans them, calls the REST API and returns
//! text. Tools never fail: errors and empty results come back as sentences.

mod encounter;
mod patient;

use crate::client::{ApiClient, ClientResult};
use crate::sanitize::{clean_identifier, clean_optional};
use serde::Serialize;
use serde_json::{json, Value};

/// Function-tool definition advertised to the model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

impl ToolSpec {
    /// OpenAI-style `{"type": "function", "function": {...}}` wrapper.
    pub fn to_function(&self) -> Value {
        json!({"type": "function", "function": self})
    }
}

#[derive(Clone, Debug)]
pub struct Toolbox {
    client: ApiClient,
}

impl Toolbox {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs = patient::specs();
        specs.extend(encounter::specs());
        specs
    }

    /// Run a tool by name.
    pub async fn call(&self, name: &str, args: &Value) -> String {
        let args = ToolArgs(args);
        tracing::info!("Calling tool {} with {}", name, args.0);
        let client = &self.client;

        match name {
            "get_patient_info" => patient::get_patient_info(client, &args).await,
            "search_patients" => patient::search_patients(client, &args).await,
            "get_patient_conditions" => patient::get_patient_conditions(client, &args).await,
            "get_patient_encounters" => patient::get_patient_encounters(client, &args).await,
            "get_patient_summary" => patient::get_patient_summary(client, &args).await,
            "get_encounter_details" => encounter::get_encounter_details(client, &args).await,
            "search_encounters" => encounter::search_encounters(client, &args).await,
            "get_encounters_by_date_range" => {
                encounter::get_encounters_by_date_range(client, &args).await
            }
            "get_encounters_by_practitioner" => {
                encounter::get_encounters_by_practitioner(client, &args).await
            }
            "get_encounters_by_organization" => {
                encounter::get_encounters_by_organization(client, &args).await
            }
            "get_encounter_statistics" => encounter::get_encounter_statistics(client).await,
            other => {
                tracing::warn!("Model requested unknown tool {}", other);
                let names: Vec<&str> = self.specs().iter().map(|s| s.name).collect();
                format!(
                    "Unknown tool: {other}. Available tools: {}.",
                    names.join(", ")
                )
            }
        }
    }
}

/// Tool-call arguments as sent by the model.
///
/// Usually a JSON object. When the model's argument JSON does not parse it arrives as a raw
/// string, which is read as `key=value` pairs separated by commas.
pub(crate) struct ToolArgs<'a>(pub(crate) &'a Value);

impl ToolArgs<'_> {
    /// Cleaned text value of `key`.
    pub(crate) fn text(&self, key: &str) -> Option<String> {
        match self.0 {
            Value::Object(map) => match map.get(key)? {
                Value::String(s) => clean_optional(Some(s.as_str())),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            },
            Value::String(raw) => raw.split(',').find_map(|segment| {
                let (k, _) = segment.split_once('=')?;
                let k = clean_identifier(k);
                if k == key {
                    clean_optional(Some(segment))
                } else {
                    None
                }
            }),
            _ => None,
        }
    }

    /// Like [`ToolArgs::text`] but a bare raw string counts as the value of `key`.
    pub(crate) fn primary(&self, key: &str) -> Option<String> {
        match self.0 {
            Value::String(raw) => self.text(key).or_else(|| clean_optional(Some(raw.as_str()))),
            _ => self.text(key),
        }
    }

    /// Integer value of `key`; a present value that is not an integer is an error sentence.
    pub(crate) fn int(&self, key: &str) -> Result<Option<i64>, String> {
        if let Value::Object(map) = self.0 {
            if let Some(n) = map.get(key).and_then(Value::as_i64) {
                return Ok(Some(n));
            }
        }
        match self.text(key) {
            None => Ok(None),
            Some(v) => v
                .parse::<i64>()
                .map(Some)
                .map_err(|_| format!("{key} must be an integer, got {v}")),
        }
    }

    pub(crate) fn primary_int(&self, key: &str) -> Result<Option<i64>, String> {
        match self.0 {
            Value::String(_) => match self.primary(key) {
                None => Ok(None),
                Some(v) => v
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| format!("{key} must be an integer, got {v}")),
            },
            _ => self.int(key),
        }
    }
}

/// Page size for search tools: default 20, capped at the API maximum.
pub(crate) fn search_limit(args: &ToolArgs<'_>) -> Result<i64, String> {
    Ok(args.int("limit")?.unwrap_or(20).clamp(1, 100))
}

/// Decode a list response, tolerating anything that is not an array as empty.
pub(crate) fn as_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Largest page the API serves.
pub(crate) const PAGE_SIZE: i64 = 100;

/// Every row matching `filters`, fetched page by page until a short page comes back.
pub(crate) async fn fetch_all(
    client: &ApiClient,
    path: &str,
    filters: &[(&str, String)],
) -> ClientResult<Vec<Value>> {
    let mut rows = Vec::new();
    let mut offset = 0;
    loop {
        let mut params = filters.to_vec();
        params.push(("limit", PAGE_SIZE.to_string()));
        params.push(("offset", offset.to_string()));

        let page = as_list(client.get(path, &params).await?);
        let fetched = page.len() as i64;
        rows.extend(page);
        if fetched < PAGE_SIZE {
            return Ok(rows);
        }
        offset += PAGE_SIZE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_api;

    #[test]
    fn test_args_from_object() {
        let value = json!({"patient_identifier": "patient_identifier=\"2\"", "limit": 5, "gender": ""});
        let args = ToolArgs(&value);
        assert_eq!(args.text("patient_identifier"), Some("2".into()));
        assert_eq!(args.int("limit"), Ok(Some(5)));
        assert_eq!(args.text("gender"), None);
        assert_eq!(args.text("missing"), None);
    }

    #[test]
    fn test_args_from_raw_string() {
        let value = Value::String("first_name=\"Robert854\", last_name=Botsford977".into());
        let args = ToolArgs(&value);
        assert_eq!(args.text("first_name"), Some("Robert854".into()));
        assert_eq!(args.text("last_name"), Some("Botsford977".into()));

        let bare = Value::String("'2'".into());
        assert_eq!(ToolArgs(&bare).primary("patient_identifier"), Some("2".into()));
        assert_eq!(ToolArgs(&bare).primary_int("encounter_id"), Ok(Some(2)));
    }

    #[test]
    fn test_int_rejects_text() {
        let value = json!({"practitioner_id": "dr-who"});
        assert_eq!(
            ToolArgs(&value).int("practitioner_id"),
            Err("practitioner_id must be an integer, got dr-who".into())
        );
        let quoted = json!({"practitioner_id": "\"4\""});
        assert_eq!(ToolArgs(&quoted).int("practitioner_id"), Ok(Some(4)));
    }

    #[test]
    fn test_search_limit_bounds() {
        assert_eq!(search_limit(&ToolArgs(&json!({}))), Ok(20));
        assert_eq!(search_limit(&ToolArgs(&json!({"limit": 500}))), Ok(100));
        assert_eq!(search_limit(&ToolArgs(&json!({"limit": 0}))), Ok(1));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_sentence() {
        let (client, _services) = spawn_api().await;
        let toolbox = Toolbox::new(client);
        let text = toolbox.call("get_weather", &json!({})).await;
        assert!(text.starts_with("Unknown tool: get_weather."));
        assert!(text.contains("get_patient_info"));
    }

    #[test]
    fn test_specs_are_unique_objects() {
        let specs = [patient::specs(), encounter::specs()].concat();
        assert_eq!(specs.len(), 11);
        let mut names: Vec<&str> = specs.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 11);
        for spec in &specs {
            assert_eq!(spec.parameters["type"], "object");
            assert_eq!(spec.to_function()["function"]["name"], spec.name);
        }
    }
}
