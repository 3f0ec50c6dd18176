use super::{as_list, fetch_all, search_limit, ToolArgs, ToolSpec};
use crate::client::ApiClient;
use crate::format::{condition_summary, encounter_summary, numbered, patient_summary};
use crate::sanitize::numeric_id;
use serde_json::{json, Value};

const IDENTIFIER_PARAMETERS: &str = "The patient id (integer) or identifier (MRN). Pass the bare value, e.g. 2 or MRN-1001.";

fn identifier_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "patient_identifier": {"type": "string", "description": IDENTIFIER_PARAMETERS}
        },
        "required": ["patient_identifier"]
    })
}

pub(super) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "get_patient_info",
            description: "Get detailed information about a specific patient by their id or identifier.",
            parameters: identifier_schema(),
        },
        ToolSpec {
            name: "search_patients",
            description: "Search for patients. Names match partially; pass a single given name as first_name only.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "first_name": {"type": "string", "description": "First name (partial match), e.g. Maxwell782"},
                    "last_name": {"type": "string", "description": "Last name (partial match), e.g. Koepp521"},
                    "birth_date": {"type": "string", "description": "Birth date, YYYY-MM-DD"},
                    "gender": {"type": "string", "description": "male, female, other or unknown"},
                    "limit": {"type": "integer", "description": "Maximum results (default 20, max 100)"}
                }
            }),
        },
        ToolSpec {
            name: "get_patient_conditions",
            description: "Get all medical conditions recorded for a specific patient.",
            parameters: identifier_schema(),
        },
        ToolSpec {
            name: "get_patient_encounters",
            description: "Get all medical encounters for a specific patient.",
            parameters: identifier_schema(),
        },
        ToolSpec {
            name: "get_patient_summary",
            description: "Get a combined summary of a patient: basic information, conditions and encounters.",
            parameters: identifier_schema(),
        },
    ]
}

/// Look a patient up by id when the identifier is all digits, otherwise by MRN.
async fn resolve(client: &ApiClient, identifier: &str) -> Result<Value, String> {
    let result = match numeric_id(identifier) {
        Some(id) => client.get(&format!("/patients/{id}"), &[]).await,
        None => client
            .get("/patients", &[("identifier", identifier.to_string())])
            .await
            .map(|found| as_list(found).into_iter().next().unwrap_or(Value::Null)),
    };

    match result {
        Ok(Value::Null) => Err(format!("No patient found with identifier: {identifier}")),
        Ok(patient) => Ok(patient),
        Err(e) if e.is_not_found() => Err(format!("No patient found with identifier: {identifier}")),
        Err(e) => Err(format!("Error retrieving patient {identifier}: {}", e.message)),
    }
}

fn identifier_arg(args: &ToolArgs<'_>) -> Result<String, String> {
    args.primary("patient_identifier")
        .ok_or_else(|| "A patient identifier is required.".to_string())
}

fn patient_id(patient: &Value) -> i64 {
    patient.get("id").and_then(Value::as_i64).unwrap_or_default()
}

pub(super) async fn get_patient_info(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    let identifier = match identifier_arg(args) {
        Ok(identifier) => identifier,
        Err(sentence) => return sentence,
    };
    match resolve(client, &identifier).await {
        Ok(patient) => patient_summary(&patient),
        Err(sentence) => sentence,
    }
}

pub(super) async fn search_patients(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    let limit = match search_limit(args) {
        Ok(limit) => limit,
        Err(sentence) => return sentence,
    };

    let mut params: Vec<(&str, String)> = ["first_name", "last_name", "birth_date", "gender"]
        .into_iter()
        .filter_map(|key| args.text(key).map(|value| (key, value)))
        .collect();
    params.push(("limit", limit.to_string()));

    let patients = match client.get("/patients", &params).await {
        Ok(found) => as_list(found),
        Err(e) => return format!("Error searching patients: {}", e.message),
    };

    if patients.is_empty() {
        return "No patients found matching the search criteria.".into();
    }
    format!(
        "Found {} patient(s):\n\n{}",
        patients.len(),
        numbered(&patients, "patients", patient_summary)
    )
}

async fn patient_records(
    client: &ApiClient,
    args: &ToolArgs<'_>,
    path: &str,
    noun: &str,
    render: fn(&Value) -> String,
) -> String {
    let identifier = match identifier_arg(args) {
        Ok(identifier) => identifier,
        Err(sentence) => return sentence,
    };
    let patient = match resolve(client, &identifier).await {
        Ok(patient) => patient,
        Err(sentence) => return sentence,
    };

    let filters = [("patient_id", patient_id(&patient).to_string())];
    let records = match fetch_all(client, path, &filters).await {
        Ok(found) => found,
        Err(e) => {
            return format!(
                "Error retrieving {noun} for patient {identifier}: {}",
                e.message
            )
        }
    };

    if records.is_empty() {
        return format!("No {noun} found for patient {identifier}.");
    }
    format!(
        "Patient {identifier} has {} {}(s):\n\n{}",
        records.len(),
        noun.trim_end_matches('s'),
        numbered(&records, noun, render)
    )
}

pub(super) async fn get_patient_conditions(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    patient_records(client, args, "/conditions", "conditions", condition_summary).await
}

pub(super) async fn get_patient_encounters(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    patient_records(client, args, "/encounters", "encounters", encounter_summary).await
}

pub(super) async fn get_patient_summary(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    let identifier = match identifier_arg(args) {
        Ok(identifier) => identifier,
        Err(sentence) => return sentence,
    };
    let patient = match resolve(client, &identifier).await {
        Ok(patient) => patient,
        Err(sentence) => return sentence,
    };

    // Resolved once; the id form avoids a second MRN lookup per section.
    let by_id = json!({"patient_identifier": patient_id(&patient).to_string()});
    let by_id = ToolArgs(&by_id);
    let conditions = get_patient_conditions(client, &by_id).await;
    let encounters = get_patient_encounters(client, &by_id).await;

    format!(
        "=== PATIENT SUMMARY ===\n\nBASIC INFORMATION:\n{}\n\nMEDICAL CONDITIONS:\n{}\n\nMEDICAL ENCOUNTERS:\n{}\n",
        patient_summary(&patient),
        conditions,
        encounters
    )
}
