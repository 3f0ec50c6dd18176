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
use hc_core::models::{NewObservation, Observation, ObservationFilter};
use serde_json::{Map, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/observations", get(list_observations).post(create_observation))
        .route(
            "/observations/:id",
            get(get_observation).put(update_observation).delete(delete_observation),
        )
}

#[utoipa::path(
    get,
    path = "/api/v2/observations",
    tag = "observations",
    params(ObservationFilter),
    responses(
        (status = 200, description = "Matching observations ordered by id", body = [Observation]),
        (status = 422, description = "Invalid filter or paging values", body = ErrorBody)
    )
)]
/// List observations
///
/// `code` matches a case-insensitive substring; `effective_from`/`effective_to` bound
/// `effective_time`.
#[axum::debug_handler]
pub async fn list_observations(
    State(state): State<AppState>,
    Query(filter): Query<ObservationFilter>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    Ok(Json(state.services.observations.list(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v2/observations/{id}",
    tag = "observations",
    params(("id" = i64, Path, description = "Observation id")),
    responses(
        (status = 200, description = "Observation", body = Observation),
        (status = 404, description = "Observation not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_observation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Observation>, ApiError> {
    Ok(Json(state.services.observations.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v2/observations",
    tag = "observations",
    request_body = NewObservation,
    responses(
        (status = 201, description = "Observation created", body = Observation),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Create a new observation
#[axum::debug_handler]
pub async fn create_observation(
    State(state): State<AppState>,
    Json(new): Json<NewObservation>,
) -> Result<(StatusCode, Json<Observation>), ApiError> {
    let created = state.services.observations.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v2/observations/{id}",
    tag = "observations",
    params(("id" = i64, Path, description = "Observation id")),
    request_body(content = NewObservation, description = "Any subset of observation fields"),
    responses(
        (status = 200, description = "Updated observation", body = Observation),
        (status = 404, description = "Observation not found", body = ErrorBody),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Update an observation
///
/// Only the fields present in the body change; an explicit `null` clears a nullable field.
#[axum::debug_handler]
pub async fn update_observation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Observation>, ApiError> {
    Ok(Json(state.services.observations.update(id, &patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v2/observations/{id}",
    tag = "observations",
    params(("id" = i64, Path, description = "Observation id")),
    responses(
        (status = 204, description = "Observation deleted"),
        (status = 404, description = "Observation not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_observation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.observations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
