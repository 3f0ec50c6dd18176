use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Practitioner {
    pub id: i64,
    pub identifier: Option<String>,
    pub name: String,
    pub gender: Option<String>,
    pub specialty_code: Option<String>,
    pub specialty_display: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub organization_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewPractitioner {
    #[serde(default)]
    pub identifier: Option<String>,
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub specialty_code: Option<String>,
    #[serde(default)]
    pub specialty_display: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub organization_id: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PractitionerFilter {
    /// Case-insensitive substring match.
    pub name: Option<String>,
    pub organization_id: Option<i64>,
    pub specialty_code: Option<String>,
    pub gender: Option<String>,
    pub identifier: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
