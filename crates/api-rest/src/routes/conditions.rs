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
use hc_core::models::{NewCondition, Condition, ConditionFilter};
use serde_json::{Map, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/conditions", get(list_conditions).post(create_condition))
        .route(
            "/conditions/:id",
            get(get_condition).put(update_condition).delete(delete_condition),
        )
}

#[utoipa::path(
    get,
    path = "/api/v2/conditions",
    tag = "conditions",
    params(ConditionFilter),
    responses(
        (status = 200, description = "Matching conditions ordered by id", body = [Condition]),
        (status = 422, description = "Invalid filter or paging values", body = ErrorBody)
    )
)]
/// List conditions
///
/// `code` matches a case-insensitive substring; `onset_from`/`onset_to` bound `onset_time`.
#[axum::debug_handler]
pub async fn list_conditions(
    State(state): State<AppState>,
    Query(filter): Query<ConditionFilter>,
) -> Result<Json<Vec<Condition>>, ApiError> {
    Ok(Json(state.services.conditions.list(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v2/conditions/{id}",
    tag = "conditions",
    params(("id" = i64, Path, description = "Condition id")),
    responses(
        (status = 200, description = "Condition", body = Condition),
        (status = 404, description = "Condition not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_condition(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Condition>, ApiError> {
    Ok(Json(state.services.conditions.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v2/conditions",
    tag = "conditions",
    request_body = NewCondition,
    responses(
        (status = 201, description = "Condition created", body = Condition),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Create a new condition
///
/// `patient_id` must reference an existing patient and `encounter_id`, when given, an existing
/// encounter.
#[axum::debug_handler]
pub async fn create_condition(
    State(state): State<AppState>,
    Json(new): Json<NewCondition>,
) -> Result<(StatusCode, Json<Condition>), ApiError> {
    let created = state.services.conditions.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v2/conditions/{id}",
    tag = "conditions",
    params(("id" = i64, Path, description = "Condition id")),
    request_body(content = NewCondition, description = "Any subset of condition fields"),
    responses(
        (status = 200, description = "Updated condition", body = Condition),
        (status = 404, description = "Condition not found", body = ErrorBody),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Update a condition
///
/// Only the fields present in the body change; an explicit `null` clears a nullable field.
#[axum::debug_handler]
pub async fn update_condition(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Condition>, ApiError> {
    Ok(Json(state.services.conditions.update(id, &patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v2/conditions/{id}",
    tag = "conditions",
    params(("id" = i64, Path, description = "Condition id")),
    responses(
        (status = 204, description = "Condition deleted"),
        (status = 404, description = "Condition not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_condition(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.conditions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
