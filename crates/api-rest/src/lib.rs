//! # API REST
//!
//! REST API implementation for the healthcare records service.
//!
//! Handles:
//! - HTTP endpoints with axum, mounted under `/api/v2`
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, `{"detail"}` errors, CORS, request tracing)
//!
//! Uses `api-shared` for common types and `hc-core` for persistence.

#![warn(rust_2018_idioms)]

pub mod docs;
pub mod error;
pub mod extract;
pub mod routes;

use api_shared::API_PREFIX;
use axum::Router;
use hc_core::Services;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use docs::ApiDoc;
pub use error::ApiError;

/// Application state shared across REST API handlers
///
/// Holds one persistence service per entity; each wraps a clone of the same pool.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

/// Build the full application router.
pub fn router(services: Services) -> Router {
    Router::new()
        .nest(API_PREFIX, routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { services })
}

/// Serve the application on an already-bound listener until the future is dropped.
///
/// # Errors
///
/// Returns an error if the HTTP server fails while running.
pub async fn serve(listener: TcpListener, services: Services) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("-- Serving healthcare REST API on {}{}", addr, API_PREFIX);
    }
    axum::serve(listener, router(services)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use hc_core::db::connect_in_memory;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let pool = connect_in_memory().await.expect("in-memory pool");
        router(Services::new(pool))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .expect("request should build");

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, value)
    }

    fn ada() -> Value {
        json!({
            "identifier": "MRN-1001",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "birth_date": "1990-05-15",
            "gender": "female"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let (status, body) = send(&app, Method::GET, "/api/v2/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "api": "v2"}));
    }

    #[tokio::test]
    async fn test_patient_defaults_active_and_condition_names_missing_encounter() {
        let app = test_app().await;

        let (status, created) = send(&app, Method::POST, "/api/v2/patients", Some(ada())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().expect("id should be an integer");

        let (status, fetched) = send(&app, Method::GET, &format!("/api/v2/patients/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["active"], json!(true));
        assert_eq!(fetched["birth_date"], json!("1990-05-15"));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v2/conditions",
            Some(json!({"patient_id": id, "encounter_id": 9999, "code": "44054006"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body["detail"].as_str().expect("detail should be a string");
        assert!(detail.contains("encounter_id"), "{detail}");
    }

    #[tokio::test]
    async fn test_patient_crud_lifecycle() {
        let app = test_app().await;
        let (_, created) = send(&app, Method::POST, "/api/v2/patients", Some(ada())).await;
        let id = created["id"].as_i64().expect("id");
        let uri = format!("/api/v2/patients/{id}");

        let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({"city": "NYC"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["city"], json!("NYC"));
        assert_eq!(updated["first_name"], json!("Ada"));

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Patient not found"}));

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_required_field_is_unprocessable() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v2/patients",
            Some(json!({"identifier": "MRN-1", "first_name": "Ada"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v2/organizations",
            Some(json!({"identifier": "ORG-1", "name": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({"detail": "name cannot be empty"}));
    }

    #[tokio::test]
    async fn test_bad_path_and_query_are_unprocessable() {
        let app = test_app().await;
        let (status, body) = send(&app, Method::GET, "/api/v2/patients/abc", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, _) = send(&app, Method::GET, "/api/v2/patients?limit=lots", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_list_pagination_bounds() {
        let app = test_app().await;
        for i in 0..5 {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/v2/organizations",
                Some(json!({"identifier": format!("ORG-{i}"), "name": format!("Clinic {i}")})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, page) = send(&app, Method::GET, "/api/v2/organizations?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page.as_array().map(Vec::len), Some(2));

        let (_, rest) = send(&app, Method::GET, "/api/v2/organizations?limit=2&offset=4", None).await;
        assert_eq!(rest.as_array().map(Vec::len), Some(1));
        assert_eq!(rest[0]["identifier"], json!("ORG-4"));

        let (status, all) = send(&app, Method::GET, "/api/v2/organizations?limit=500", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().map(Vec::len), Some(5));

        let (status, _) = send(&app, Method::GET, "/api/v2/organizations?limit=0", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_duplicate_organization_identifier_is_conflict() {
        let app = test_app().await;
        let body = json!({"identifier": "ORG-1", "name": "General Hospital"});
        let (status, _) = send(&app, Method::POST, "/api/v2/organizations", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Method::POST, "/api/v2/organizations", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"detail": "organization identifier ORG-1 already exists"}));
    }

    #[tokio::test]
    async fn test_encounter_filters_and_restricted_patient_delete() {
        let app = test_app().await;
        let (_, patient) = send(&app, Method::POST, "/api/v2/patients", Some(ada())).await;
        let patient_id = patient["id"].as_i64().expect("id");

        for start in ["2024-01-10T09:00:00Z", "2024-02-10T09:00:00Z"] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/v2/encounters",
                Some(json!({
                    "patient_id": patient_id,
                    "status": "finished",
                    "class_code": "AMB",
                    "start_time": start
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let uri = format!(
            "/api/v2/encounters?patient_id={patient_id}&start_from=2024-02-01&start_to=2024-02-28"
        );
        let (status, found) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found.as_array().map(Vec::len), Some(1));
        assert_eq!(found[0]["start_time"], json!("2024-02-10T09:00:00Z"));

        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/v2/patients/{patient_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["detail"]
            .as_str()
            .is_some_and(|d| d.contains("encounter")));
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = test_app().await;
        let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/api/v2/patients/{id}"].is_object());
    }
}
