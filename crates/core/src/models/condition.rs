use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A problem, diagnosis or finding recorded against a patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Condition {
    pub id: i64,
    pub patient_id: i64,
    pub encounter_id: Option<i64>,
    /// SNOMED CT or ICD-10 code, stored as given.
    pub code: String,
    pub system: Option<String>,
    pub display: Option<String>,
    pub category_code: Option<String>,
    pub clinical_status: Option<String>,
    pub verification_status: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub onset_time: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub abatement_time: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub recorded_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewCondition {
    pub patient_id: i64,
    #[serde(default)]
    pub encounter_id: Option<i64>,
    pub code: String,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub category_code: Option<String>,
    #[serde(default)]
    pub clinical_status: Option<String>,
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub onset_time: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub abatement_time: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub recorded_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConditionFilter {
    pub patient_id: Option<i64>,
    pub encounter_id: Option<i64>,
    /// Case-insensitive substring match.
    pub code: Option<String>,
    pub clinical_status: Option<String>,
    pub verification_status: Option<String>,
    pub category_code: Option<String>,
    pub onset_from: Option<String>,
    pub onset_to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
