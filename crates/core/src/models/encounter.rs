use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A visit or contact between a patient and the care system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Encounter {
    pub id: i64,
    pub patient_id: i64,
    pub practitioner_id: Option<i64>,
    pub organization_id: Option<i64>,
    pub identifier: Option<String>,
    pub status: String,
    /// Encounter class, e.g. `AMB`, `EMER`, `IMP`.
    pub class_code: Option<String>,
    pub class_display: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub end_time: Option<DateTime<Utc>>,
    pub reason_code: Option<String>,
    pub reason_display: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewEncounter {
    pub patient_id: i64,
    #[serde(default)]
    pub practitioner_id: Option<i64>,
    #[serde(default)]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub identifier: Option<String>,
    pub status: String,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_display: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason_code: Option<String>,
    #[serde(default)]
    pub reason_display: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EncounterFilter {
    pub patient_id: Option<i64>,
    pub practitioner_id: Option<i64>,
    pub organization_id: Option<i64>,
    pub status: Option<String>,
    pub class_code: Option<String>,
    /// Encounters starting at or after this date or timestamp.
    pub start_from: Option<String>,
    /// Encounters starting at or before this timestamp, or on or before this date.
    pub start_to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
