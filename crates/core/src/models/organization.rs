use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A healthcare provider organisation (hospital, clinic, payer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Organization {
    pub id: i64,
    pub identifier: String,
    pub name: String,
    pub type_code: Option<String>,
    pub type_display: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    /// Identifier of the parent organisation, if any.
    pub part_of_identifier: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewOrganization {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub type_code: Option<String>,
    #[serde(default)]
    pub type_display: Option<String>,
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
    pub part_of_identifier: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrganizationFilter {
    /// Case-insensitive substring match.
    pub name: Option<String>,
    pub type_code: Option<String>,
    /// Case-insensitive substring match.
    pub city: Option<String>,
    pub state: Option<String>,
    pub identifier: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
