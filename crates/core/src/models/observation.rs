use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A measurement or assertion (vital sign, lab result, survey answer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Observation {
    pub id: i64,
    pub patient_id: i64,
    pub encounter_id: Option<i64>,
    pub practitioner_id: Option<i64>,
    pub identifier: Option<String>,
    pub status: String,
    /// Usually a LOINC code.
    pub code: String,
    pub code_system: Option<String>,
    pub code_display: Option<String>,
    pub value_quantity: Option<f64>,
    pub value_unit: Option<String>,
    pub value_string: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub effective_time: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub issued_time: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewObservation {
    pub patient_id: i64,
    #[serde(default)]
    pub encounter_id: Option<i64>,
    #[serde(default)]
    pub practitioner_id: Option<i64>,
    #[serde(default)]
    pub identifier: Option<String>,
    pub status: String,
    pub code: String,
    #[serde(default)]
    pub code_system: Option<String>,
    #[serde(default)]
    pub code_display: Option<String>,
    #[serde(default)]
    pub value_quantity: Option<f64>,
    #[serde(default)]
    pub value_unit: Option<String>,
    #[serde(default)]
    pub value_string: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub effective_time: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub issued_time: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ObservationFilter {
    pub patient_id: Option<i64>,
    pub encounter_id: Option<i64>,
    pub practitioner_id: Option<i64>,
    pub status: Option<String>,
    /// Case-insensitive substring match.
    pub code: Option<String>,
    pub effective_from: Option<String>,
    pub effective_to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
