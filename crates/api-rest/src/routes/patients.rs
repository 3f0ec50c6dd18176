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
use hc_core::models::{NewPatient, Patient, PatientFilter};
use serde_json::{Map, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
}

#[utoipa::path(
    get,
    path = "/api/v2/patients",
    tag = "patients",
    params(PatientFilter),
    responses(
        (status = 200, description = "Matching patients ordered by id", body = [Patient]),
        (status = 422, description = "Invalid filter or paging values", body = ErrorBody)
    )
)]
/// List patients
///
/// `first_name` and `last_name` match case-insensitive substrings; other filters are exact.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    Query(filter): Query<PatientFilter>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(state.services.patients.list(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v2/patients/{id}",
    tag = "patients",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient", body = Patient),
        (status = 404, description = "Patient not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(state.services.patients.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v2/patients",
    tag = "patients",
    request_body = NewPatient,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 409, description = "Identifier already in use", body = ErrorBody),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Create a new patient record
///
/// `active` defaults to `true` when omitted.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    Json(new): Json<NewPatient>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let created = state.services.patients.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v2/patients/{id}",
    tag = "patients",
    params(("id" = i64, Path, description = "Patient id")),
    request_body(content = NewPatient, description = "Any subset of patient fields"),
    responses(
        (status = 200, description = "Updated patient", body = Patient),
        (status = 404, description = "Patient not found", body = ErrorBody),
        (status = 409, description = "Identifier already in use", body = ErrorBody),
        (status = 422, description = "Validation failure", body = ErrorBody)
    )
)]
/// Update a patient
///
/// Only the fields present in the body change; an explicit `null` clears a nullable field.
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(state.services.patients.update(id, &patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v2/patients/{id}",
    tag = "patients",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 404, description = "Patient not found", body = ErrorBody),
        (status = 409, description = "Patient still has clinical records", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.patients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
