use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A person receiving care. All clinical records hang off a patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Patient {
    pub id: i64,
    /// Medical record number, unique across patients.
    pub identifier: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub marital_status: Option<String>,
    pub language: Option<String>,
    pub race: Option<String>,
    pub ethnicity: Option<String>,
    /// Free text, as recorded by the source system.
    pub deceased_date: Option<String>,
    pub active: bool,
    pub managing_organization_identifier: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewPatient {
    pub identifier: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, format = Date, example = "1990-05-15")]
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address_line: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub deceased_date: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub managing_organization_identifier: Option<String>,
}

impl NewPatient {
    /// Minimal payload with the required fields set and everything else defaulted.
    pub fn new(
        identifier: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
            gender: None,
            phone: None,
            email: None,
            address_line: None,
            city: None,
            state: None,
            postal_code: None,
            marital_status: None,
            language: None,
            race: None,
            ethnicity: None,
            deceased_date: None,
            active: true,
            managing_organization_identifier: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientFilter {
    pub identifier: Option<String>,
    /// Case-insensitive substring match.
    pub first_name: Option<String>,
    /// Case-insensitive substring match.
    pub last_name: Option<String>,
    #[param(value_type = Option<String>, format = Date)]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
