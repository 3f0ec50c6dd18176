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
use hc_core::models::{NewPractitioner, Practitioner, PractitionerFilter};
use serde_json::{Map, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/practitioners", get(list_practitioners).post(create_practitioner))
        .route(
            "/practitioners/:id",
            get(get_practitioner).put(update_practitioner).delete(delete_practitioner),
        )
}

#[utoipa::path(
    get,
    path = "/api/v2/practitioners",
    tag = "practitioners",
    params(PractitionerFilter),
    responses(
        (status = 200, description = "Matching practitioners ordered by id", body = [Practitioner]),
        (status = 422, description = "Invalid filter or paging values", body = ErrorBody)
    )
)]
/// List practitioners
///
/// `name` matches a case-insensitive substring; other filters are exact.
#[axum::debug_handler]
pub async fn list_practitioners(
    State(state): State<AppState>,
    Query(filter): Query<PractitionerFilter>,
) -> Result<Json<Vec<Practitioner>>, ApiError> {
    Ok(Json(state.services.practitioners.list(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v2/practitioners/{id}",
    tag = "practitioners",
    params(("id" = i64, Path, description = "Practitioner id")),
    responses(
        (status = 200, description = "Practitioner", body = Practitioner),
        (status = 404, description = "Practitioner not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_practitioner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Practitioner>, ApiError> {
    Ok(Json(state.services.practitioners.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v2/practitioners",
    tag = "practitioners",
    request_body = NewPractitioner,
    responses(
        (status = 201, description = "Practitioner created", body = Practitioner),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Create a new practitioner
///
/// `organization_id`, when given, must reference an existing organization.
#[axum::debug_handler]
pub async fn create_practitioner(
    State(state): State<AppState>,
    Json(new): Json<NewPractitioner>,
) -> Result<(StatusCode, Json<Practitioner>), ApiError> {
    let created = state.services.practitioners.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v2/practitioners/{id}",
    tag = "practitioners",
    params(("id" = i64, Path, description = "Practitioner id")),
    request_body(content = NewPractitioner, description = "Any subset of practitioner fields"),
    responses(
        (status = 200, description = "Updated practitioner", body = Practitioner),
        (status = 404, description = "Practitioner not found", body = ErrorBody),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Update a practitioner
///
/// Only the fields present in the body change; an explicit `null` clears a nullable field.
#[axum::debug_handler]
pub async fn update_practitioner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Practitioner>, ApiError> {
    Ok(Json(state.services.practitioners.update(id, &patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v2/practitioners/{id}",
    tag = "practitioners",
    params(("id" = i64, Path, description = "Practitioner id")),
    responses(
        (status = 204, description = "Practitioner deleted"),
        (status = 404, description = "Practitioner not found", body = ErrorBody),
        (status = 409, description = "Practitioner still referenced by encounters or observations", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_practitioner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.practitioners.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
