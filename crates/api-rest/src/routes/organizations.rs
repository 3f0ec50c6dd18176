use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::AppState;
use api_shared::ErrorBody;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use hc_core::models::{NewOrganization, Organization, OrganizationFilter};
use serde_json::{Map, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", get(list_organizations).post(create_organization))
        .route(
            "/organizations/:id",
            get(get_organization).put(update_organization).delete(delete_organization),
        )
}

#[utoipa::path(
    get,
    path = "/api/v2/organizations",
    tag = "organizations",
    params(OrganizationFilter),
    responses(
        (status = 200, description = "Matching organizations ordered by id", body = [Organization]),
        (status = 422, description = "Invalid filter or paging values", body = ErrorBody)
    )
)]
/// List organizations
///
/// `name` and `city` match case-insensitive substrings; other filters are exact.
#[axum::debug_handler]
pub async fn list_organizations(
    State(state): State<AppState>,
    Query(filter): Query<OrganizationFilter>,
) -> Result<Json<Vec<Organization>>, ApiError> {
    Ok(Json(state.services.organizations.list(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v2/organizations/{id}",
    tag = "organizations",
    params(("id" = i64, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Organization", body = Organization),
        (status = 404, description = "Organization not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Organization>, ApiError> {
    Ok(Json(state.services.organizations.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v2/organizations",
    tag = "organizations",
    request_body = NewOrganization,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Create a new organization
#[axum::debug_handler]
pub async fn create_organization(
    State(state): State<AppState>,
    Json(new): Json<NewOrganization>,
) -> Result<(StatusCode, Json<Organization>), ApiError> {
    let created = state.services.organizations.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v2/organizations/{id}",
    tag = "organizations",
    params(("id" = i64, Path, description = "Organization id")),
    request_body(content = NewOrganization, description = "Any subset of organization fields"),
    responses(
        (status = 200, description = "Updated organization", body = Organization),
        (status = 404, description = "Organization not found", body = ErrorBody),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Update an organization
///
/// Only the fields present in the body change; an explicit `null` clears a nullable field.
#[axum::debug_handler]
pub async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Organization>, ApiError> {
    Ok(Json(state.services.organizations.update(id, &patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v2/organizations/{id}",
    tag = "organizations",
    params(("id" = i64, Path, description = "Organization id")),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 404, description = "Organization not found", body = ErrorBody),
        (status = 409, description = "Organization still referenced by practitioners or encounters", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.organizations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
