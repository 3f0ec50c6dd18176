//! Plain-text rendering of API records for the model.

use serde_json::Value;
use std::fmt::Write;

/// Lists never show more than this many records.
pub const MAX_LISTED: usize = 10;

/// Render a field, falling back when it is missing or null.
pub fn field(record: &Value, key: &str, fallback: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => fallback.to_string(),
    }
}

pub fn patient_summary(patient: &Value) -> String {
    let name = format!(
        "{} {}",
        field(patient, "first_name", "Unknown"),
        field(patient, "last_name", "Unknown")
    );
    let active = patient
        .get("active")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let mut out = String::from("**PATIENT INFORMATION**\n\n");
    let _ = writeln!(out, "**Name:** {name}");
    let _ = writeln!(out, "**ID:** {}", field(patient, "id", "Unknown"));
    let _ = writeln!(
        out,
        "**Medical Record Number:** {}",
        field(patient, "identifier", "Not assigned")
    );
    let _ = writeln!(out, "**Birth Date:** {}", field(patient, "birth_date", "Unknown"));
    let _ = writeln!(out, "**Gender:** {}", field(patient, "gender", "Unknown"));
    let _ = writeln!(
        out,
        "**Status:** {}",
        if active { "Active" } else { "Inactive" }
    );
    if let Some(Value::String(deceased)) = patient.get("deceased_date") {
        let _ = writeln!(out, "**Deceased Date:** {deceased}");
    }

    out.push_str("\n**CONTACT INFORMATION**\n\n");
    let _ = writeln!(out, "**Phone:** {}", field(patient, "phone", "Not provided"));
    let _ = writeln!(out, "**Email:** {}", field(patient, "email", "Not provided"));

    out.push_str("\n**ADDRESS**\n\n");
    let _ = writeln!(
        out,
        "**Address:** {}",
        field(patient, "address_line", "Not provided")
    );
    let _ = writeln!(out, "**City:** {}", field(patient, "city", "Not provided"));
    let _ = writeln!(out, "**State:** {}", field(patient, "state", "Not provided"));
    let _ = writeln!(
        out,
        "**Postal Code:** {}",
        field(patient, "postal_code", "Not provided")
    );

    out.push_str("\n**DEMOGRAPHICS**\n\n");
    for (label, key) in [
        ("Marital Status", "marital_status"),
        ("Language", "language"),
        ("Race", "race"),
        ("Ethnicity", "ethnicity"),
    ] {
        let _ = writeln!(out, "**{label}:** {}", field(patient, key, "Not specified"));
    }

    out.push_str("\n**ORGANIZATIONAL**\n\n");
    let _ = writeln!(
        out,
        "**Managing Organization:** {}",
        field(patient, "managing_organization_identifier", "Not assigned")
    );
    out
}

pub fn condition_summary(condition: &Value) -> String {
    format!(
        "Condition: {} ({})\nStatus: {}\nOnset Date: {}",
        field(condition, "display", "Unknown"),
        field(condition, "code", "Unknown"),
        field(condition, "clinical_status", "Unknown"),
        field(condition, "onset_time", "Unknown"),
    )
}

pub fn encounter_summary(encounter: &Value) -> String {
    format!(
        "Encounter: {}\nStatus: {}\nStart Time: {}",
        field(encounter, "class_code", "Unknown"),
        field(encounter, "status", "Unknown"),
        field(encounter, "start_time", "Unknown"),
    )
}

pub fn encounter_details(encounter: &Value) -> String {
    let mut out = String::from("=== ENCOUNTER DETAILS ===\n");
    for (label, key, fallback) in [
        ("ID", "id", "Unknown"),
        ("Status", "status", "Unknown"),
        ("Class Code", "class_code", "Unknown"),
        ("Start Time", "start_time", "Unknown"),
        ("End Time", "end_time", "Not specified"),
        ("Reason", "reason_display", "Not specified"),
        ("Patient ID", "patient_id", "Unknown"),
        ("Practitioner ID", "practitioner_id", "Not specified"),
        ("Organization ID", "organization_id", "Not specified"),
    ] {
        let _ = writeln!(out, "{label}: {}", field(encounter, key, fallback));
    }
    out
}

/// Numbered list of at most [`MAX_LISTED`] records with an "... and N more" trailer.
pub fn numbered(items: &[Value], noun: &str, render: fn(&Value) -> String) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().take(MAX_LISTED).enumerate() {
        let _ = write!(out, "{}. {}\n\n", i + 1, render(item));
    }
    if items.len() > MAX_LISTED {
        let _ = write!(out, "... and {} more {noun}.", items.len() - MAX_LISTED);
    }
    out
}
