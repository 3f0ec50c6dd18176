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
use hc_core::models::{NewEncounter, Encounter, EncounterFilter};
use serde_json::{Map, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/encounters", get(list_encounters).post(create_encounter))
        .route(
            "/encounters/:id",
            get(get_encounter).put(update_encounter).delete(delete_encounter),
        )
}

#[utoipa::path(
    get,
    path = "/api/v2/encounters",
    tag = "encounters",
    params(EncounterFilter),
    responses(
        (status = 200, description = "Matching encounters ordered by id", body = [Encounter]),
        (status = 422, description = "Invalid filter or paging values", body = ErrorBody)
    )
)]
/// List encounters
///
/// `start_from` and `start_to` accept RFC 3339 timestamps or plain dates; a plain `start_to`
/// date includes that whole day.
#[axum::debug_handler]
pub async fn list_encounters(
    State(state): State<AppState>,
    Query(filter): Query<EncounterFilter>,
) -> Result<Json<Vec<Encounter>>, ApiError> {
    Ok(Json(state.services.encounters.list(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v2/encounters/{id}",
    tag = "encounters",
    params(("id" = i64, Path, description = "Encounter id")),
    responses(
        (status = 200, description = "Encounter", body = Encounter),
        (status = 404, description = "Encounter not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_encounter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Encounter>, ApiError> {
    Ok(Json(state.services.encounters.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v2/encounters",
    tag = "encounters",
    request_body = NewEncounter,
    responses(
        (status = 201, description = "Encounter created", body = Encounter),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Create a new encounter
///
/// `patient_id` must reference an existing patient; `end_time` cannot precede `start_time`.
#[axum::debug_handler]
pub async fn create_encounter(
    State(state): State<AppState>,
    Json(new): Json<NewEncounter>,
) -> Result<(StatusCode, Json<Encounter>), ApiError> {
    let created = state.services.encounters.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v2/encounters/{id}",
    tag = "encounters",
    params(("id" = i64, Path, description = "Encounter id")),
    request_body(content = NewEncounter, description = "Any subset of encounter fields"),
    responses(
        (status = 200, description = "Updated encounter", body = Encounter),
        (status = 404, description = "Encounter not found", body = ErrorBody),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Update an encounter
///
/// Only the fields present in the body change; an explicit `null` clears a nullable field.
#[axum::debug_handler]
pub async fn update_encounter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Encounter>, ApiError> {
    Ok(Json(state.services.encounters.update(id, &patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v2/encounters/{id}",
    tag = "encounters",
    params(("id" = i64, Path, description = "Encounter id")),
    responses(
        (status = 204, description = "Encounter deleted"),
        (status = 404, description = "Encounter not found", body = ErrorBody),
        (status = 409, description = "Encounter still referenced by conditions or observations", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_encounter(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.encounters.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
