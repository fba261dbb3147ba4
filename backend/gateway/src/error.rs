//! Mapping of pipeline failures onto HTTP responses.
//!
//! The body is always `{"error": "<stable message>"}`; internal detail stays
//! in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use specscan_core::PipelineError;

pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Image exceeds the upload size limit.";

#[derive(Debug)]
pub enum ApiError {
    Pipeline(PipelineError),
    /// Body rejected by the configured size limit before it was read
    PayloadTooLarge,
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Pipeline(err) => err.public_message(),
            ApiError::PayloadTooLarge => PAYLOAD_TOO_LARGE_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
