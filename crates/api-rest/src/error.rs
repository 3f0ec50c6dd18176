//! Error to HTTP response mapping.
//!
//! Every failure leaves the API as `{"detail": "<message>"}`. Extractor rejections (malformed
//! JSON, bad query strings, non-integer ids) are reported as 422 alongside validation errors.

use api_shared::ErrorBody;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hc_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("{0}")]
    Json(#[from] JsonRejection),
    #[error("{0}")]
    Query(#[from] QueryRejection),
    #[error("{0}")]
    Path(#[from] PathRejection),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::InvalidInput(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Core(CoreError::ForeignKey { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Core(CoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Json(_) | ApiError::Query(_) | ApiError::Path(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Core(e) => match e {
                CoreError::InvalidInput(message) => message.clone(),
                other => other.to_string(),
            },
            ApiError::Json(rejection) => rejection.body_text(),
            ApiError::Query(rejection) => rejection.body_text(),
            ApiError::Path(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = if status.is_server_error() {
            tracing::error!("Request error: {:?}", self);
            "Internal server error".to_string()
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", self);
            self.detail()
        };

        (status, axum::Json(ErrorBody::new(detail))).into_response()
    }
}
