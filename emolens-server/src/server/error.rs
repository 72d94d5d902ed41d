//! Mapping of analysis failures to HTTP responses.
//!
//! Every error body has the shape `{"detail": "<message>"}`.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use emolens_core::EmolensError;
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<EmolensError> for ApiError {
    fn from(err: EmolensError) -> Self {
        let status = match &err {
            EmolensError::Decode(_) | EmolensError::Validation(_) => StatusCode::BAD_REQUEST,
            EmolensError::Computation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EmolensError::Prediction(_) | EmolensError::Io(_) | EmolensError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        // Oversized bodies surface here as 413; malformed multipart as 400.
        Self::new(err.status(), format!("invalid multipart body: {}", err.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), "{}", self.message);
        } else {
            warn!(status = self.status.as_u16(), "{}", self.message);
        }
        (self.status, Json(json!({ "detail": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (EmolensError::Decode("x".into()), StatusCode::BAD_REQUEST),
            (EmolensError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                EmolensError::Computation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                EmolensError::Prediction("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn message_keeps_error_kind() {
        let api = ApiError::from(EmolensError::Validation("missing `audio` field".into()));
        assert_eq!(api.message, "invalid request: missing `audio` field");
    }
}
