use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use vitals_core::AssessmentError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Assessment(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Assessment(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let message = self.to_string();
        log::warn!("request rejected ({}): {}", status.as_u16(), message);

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
