use super::{as_list, fetch_all, search_limit, ToolArgs, ToolSpec};
use crate::client::ApiClient;
use crate::format::{encounter_details, encounter_summary, field, numbered};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Write;

fn single_id_schema(key: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {key: {"type": "integer", "description": description}},
        "required": [key]
    })
}

pub(super) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "get_encounter_details",
            description: "Get detailed information about a specific medical encounter by its id.",
            parameters: single_id_schema("encounter_id", "The encounter id"),
        },
        ToolSpec {
            name: "search_encounters",
            description: "Search for medical encounters by patient, practitioner, organization, status, class or start date.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "patient_id": {"type": "integer", "description": "Filter by patient id"},
                    "practitioner_id": {"type": "integer", "description": "Filter by practitioner id"},
                    "organization_id": {"type": "integer", "description": "Filter by organization id"},
                    "status": {"type": "string", "description": "planned, arrived, triaged, in-progress, onleave, finished, cancelled, entered-in-error or unknown"},
                    "start_from": {"type": "string", "description": "Encounters starting on or after this date (YYYY-MM-DD)"},
                    "start_to": {"type": "string", "description": "Encounters starting on or before this date (YYYY-MM-DD)"},
                    "class_code": {"type": "string", "description": "Encounter class code, e.g. AMB"},
                    "limit": {"type": "integer", "description": "Maximum results (default 20, max 100)"}
                }
            }),
        },
        ToolSpec {
            name: "get_encounters_by_date_range",
            description: "Get all encounters that started within a date range.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "start_date": {"type": "string", "description": "Start date, YYYY-MM-DD"},
                    "end_date": {"type": "string", "description": "End date, YYYY-MM-DD"}
                },
                "required": ["start_date", "end_date"]
            }),
        },
        ToolSpec {
            name: "get_encounters_by_practitioner",
            description: "Get all encounters conducted by a specific practitioner.",
            parameters: single_id_schema("practitioner_id", "The practitioner id"),
        },
        ToolSpec {
            name: "get_encounters_by_organization",
            description: "Get all encounters hosted by a specific organization.",
            parameters: single_id_schema("organization_id", "The organization id"),
        },
        ToolSpec {
            name: "get_encounter_statistics",
            description: "Get counts of all encounters broken down by status and class code.",
            parameters: json!({"type": "object", "properties": {}}),
        },
    ]
}

fn listing(encounters: &[Value], header: String) -> String {
    format!("{header}\n\n{}", numbered(encounters, "encounters", encounter_summary))
}

pub(super) async fn get_encounter_details(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    let id = match args.primary_int("encounter_id") {
        Ok(Some(id)) => id,
        Ok(None) => return "An encounter id is required.".into(),
        Err(sentence) => return sentence,
    };

    match client.get(&format!("/encounters/{id}"), &[]).await {
        Ok(encounter) => encounter_details(&encounter),
        Err(e) if e.is_not_found() => format!("No encounter found with id: {id}"),
        Err(e) => format!("Error retrieving encounter {id}: {}", e.message),
    }
}

pub(super) async fn search_encounters(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();
    for key in ["patient_id", "practitioner_id", "organization_id"] {
        match args.int(key) {
            Ok(Some(id)) => params.push((key, id.to_string())),
            Ok(None) => {}
            Err(sentence) => return sentence,
        }
    }
    for key in ["status", "start_from", "start_to", "class_code"] {
        if let Some(value) = args.text(key) {
            params.push((key, value));
        }
    }
    match search_limit(args) {
        Ok(limit) => params.push(("limit", limit.to_string())),
        Err(sentence) => return sentence,
    }

    let encounters = match client.get("/encounters", &params).await {
        Ok(found) => as_list(found),
        Err(e) => return format!("Error searching encounters: {}", e.message),
    };
    if encounters.is_empty() {
        return "No encounters found matching the search criteria.".into();
    }
    listing(&encounters, format!("Found {} encounter(s):", encounters.len()))
}

pub(super) async fn get_encounters_by_date_range(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    let (Some(start), Some(end)) = (args.text("start_date"), args.text("end_date")) else {
        return "Both start_date and end_date are required (YYYY-MM-DD).".into();
    };

    let filters = [("start_from", start.clone()), ("start_to", end.clone())];
    let encounters = match fetch_all(client, "/encounters", &filters).await {
        Ok(found) => found,
        Err(e) => {
            return format!(
                "Error retrieving encounters for date range {start} to {end}: {}",
                e.message
            )
        }
    };
    if encounters.is_empty() {
        return format!("No encounters found between {start} and {end}.");
    }
    listing(
        &encounters,
        format!(
            "Found {} encounter(s) between {start} and {end}:",
            encounters.len()
        ),
    )
}

async fn encounters_for(
    client: &ApiClient,
    args: &ToolArgs<'_>,
    key: &str,
    label: &str,
    verb: &str,
) -> String {
    let id = match args.primary_int(key) {
        Ok(Some(id)) => id,
        Ok(None) => return format!("A {} id is required.", label.to_lowercase()),
        Err(sentence) => return sentence,
    };

    let filters = [(key, id.to_string())];
    let encounters = match fetch_all(client, "/encounters", &filters).await {
        Ok(found) => found,
        Err(e) => {
            return format!(
                "Error retrieving encounters for {} {id}: {}",
                label.to_lowercase(),
                e.message
            )
        }
    };
    if encounters.is_empty() {
        return format!("No encounters found for {} {id}.", label.to_lowercase());
    }
    listing(
        &encounters,
        format!("{label} {id} has {verb} {} encounter(s):", encounters.len()),
    )
}

pub(super) async fn get_encounters_by_practitioner(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    encounters_for(client, args, "practitioner_id", "Practitioner", "conducted").await
}

pub(super) async fn get_encounters_by_organization(client: &ApiClient, args: &ToolArgs<'_>) -> String {
    encounters_for(client, args, "organization_id", "Organization", "hosted").await
}

/// Counts over every encounter, paging through the API.
pub(super) async fn get_encounter_statistics(client: &ApiClient) -> String {
    let encounters = match fetch_all(client, "/encounters", &[]).await {
        Ok(found) => found,
        Err(e) => return format!("Error retrieving encounter statistics: {}", e.message),
    };

    if encounters.is_empty() {
        return "No encounters found in the system.".into();
    }

    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_class: BTreeMap<String, usize> = BTreeMap::new();
    for encounter in &encounters {
        *by_status.entry(field(encounter, "status", "unknown")).or_default() += 1;
        *by_class.entry(field(encounter, "class_code", "unknown")).or_default() += 1;
    }

    let mut out = String::from("=== ENCOUNTER STATISTICS ===\n");
    let _ = writeln!(out, "Total Encounters: {}\n", encounters.len());
    out.push_str("Status Breakdown:\n");
    for (status, count) in &by_status {
        let _ = writeln!(out, "  {status}: {count}");
    }
    out.push_str("\nClass Code Breakdown:\n");
    for (class_code, count) in &by_class {
        let _ = writeln!(out, "  {class_code}: {count}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_api;
    use chrono::{NaiveDate, TimeZone, Utc};
    use hc_core::models::{NewEncounter, NewPatient};

    async fn seed(services: &hc_core::Services, count: u32) -> i64 {
        let birth = NaiveDate::from_ymd_opt(1980, 1, 2).expect("valid date");
        let patient = services
            .patients
            .create(NewPatient::new("MRN-2", "Grace", "Hopper", birth))
            .await
            .expect("patient should insert");
        for day in 1..=count {
            services
                .encounters
                .create(NewEncounter {
                    patient_id: patient.id,
                    status: if day % 2 == 0 { "finished" } else { "planned" }.into(),
                    class_code: Some("AMB".into()),
                    start_time: Some(
                        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0)
                            .single()
                            .expect("valid timestamp"),
                    ),
                    ..NewEncounter::default()
                })
                .await
                .expect("encounter should insert");
        }
        patient.id
    }

    #[tokio::test]
    async fn test_encounter_details_and_missing() {
        let (client, services) = spawn_api().await;
        seed(&services, 1).await;

        let text = get_encounter_details(&client, &ToolArgs(&json!({"encounter_id": "\"1\""}))).await;
        assert!(text.starts_with("=== ENCOUNTER DETAILS ==="), "{text}");
        assert!(text.contains("Class Code: AMB"));
        assert!(text.contains("Practitioner ID: Not specified"));

        let missing = get_encounter_details(&client, &ToolArgs(&json!({"encounter_id": 77}))).await;
        assert_eq!(missing, "No encounter found with id: 77");

        let bad = get_encounter_details(&client, &ToolArgs(&json!({"encounter_id": "first"}))).await;
        assert_eq!(bad, "encounter_id must be an integer, got first");
    }

    #[tokio::test]
    async fn test_search_and_date_range() {
        let (client, services) = spawn_api().await;
        let patient_id = seed(&services, 12).await;

        let all = search_encounters(&client, &ToolArgs(&json!({"patient_id": patient_id}))).await;
        assert!(all.starts_with("Found 12 encounter(s):"), "{all}");
        assert!(all.ends_with("... and 2 more encounters."));

        let finished = search_encounters(
            &client,
            &ToolArgs(&json!({"status": "status='finished'", "limit": 3})),
        )
        .await;
        assert!(finished.starts_with("Found 3 encounter(s):"), "{finished}");

        let range = get_encounters_by_date_range(
            &client,
            &ToolArgs(&json!({"start_date": "2024-03-02", "end_date": "2024-03-04"})),
        )
        .await;
        assert!(
            range.starts_with("Found 3 encounter(s) between 2024-03-02 and 2024-03-04:"),
            "{range}"
        );

        let empty = get_encounters_by_date_range(
            &client,
            &ToolArgs(&json!({"start_date": "2030-01-01", "end_date": "2030-01-31"})),
        )
        .await;
        assert_eq!(empty, "No encounters found between 2030-01-01 and 2030-01-31.");

        let nobody = get_encounters_by_practitioner(&client, &ToolArgs(&json!({"practitioner_id": 5}))).await;
        assert_eq!(nobody, "No encounters found for practitioner 5.");
    }

    #[tokio::test]
    async fn test_statistics_breakdown() {
        let (client, services) = spawn_api().await;

        assert_eq!(
            get_encounter_statistics(&client).await,
            "No encounters found in the system."
        );

        seed(&services, 5).await;
        let stats = get_encounter_statistics(&client).await;
        assert!(stats.contains("Total Encounters: 5"));
        assert!(stats.contains("  finished: 2\n"));
        assert!(stats.contains("  planned: 3\n"));
        assert!(stats.contains("  AMB: 5\n"));
    }
}
