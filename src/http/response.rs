//! Error responses for the HTTP boundary.
//!
//! # Design Decisions
//! - Every error body is JSON with an `error` field
//! - Bodies over the configured limit are 413, other JSON rejections 400
//! - Spec validation failures carry the reason in `details`

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::loadtest::LoadTestError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Errors returned by the test endpoint.
#[derive(Debug)]
pub enum ApiError {
    /// The body was not a JSON array of specs.
    BadJson(JsonRejection),
    /// A spec failed validation or the engine could not start.
    LoadTest(LoadTestError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadJson(rejection)
    }
}

impl From<LoadTestError> for ApiError {
    fn from(err: LoadTestError) -> Self {
        ApiError::LoadTest(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadJson(rejection) => (
                match rejection.status() {
                    StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                },
                ErrorBody {
                    error: rejection.body_text(),
                    details: None,
                },
            ),
            ApiError::LoadTest(err @ LoadTestError::InvalidSpec { .. }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "invalid load test".to_string(),
                    details: Some(err.to_string()),
                },
            ),
            ApiError::LoadTest(err) => {
                tracing::error!(error = %err, "Load test failed to start");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "load test failed to start".to_string(),
                        details: Some(err.to_string()),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
