//! Error response helpers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use splitpot_shared::AppError;

/// Renders an `AppError` as the standard JSON error envelope.
pub fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": err.error_code().to_lowercase(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// Logs an unexpected failure and renders it as a 500.
pub fn internal_error(err: &dyn std::error::Error, context: &str) -> Response {
    error!(error = %err, "{context}");
    error_response(&AppError::Internal("An error occurred".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes() {
        assert_eq!(
            error_response(&AppError::NotFound("group".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(&AppError::Validation("bad name".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&AppError::Internal("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
