/// Unified error handling module
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Unified error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Upstream airport directory reported a failure
    #[error("{0}")]
    Lookup(String),
    /// Upstream flight search reported a failure
    #[error("{0}")]
    Search(String),
    /// Query rejected locally before any network call
    #[error("{0}")]
    Validation(String),
    #[error("External API error: {0}")]
    ExternalApi(#[from] reqwest::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    fn code_and_status(&self) -> (&'static str, StatusCode) {
        match self {
            ApiError::Lookup(_) => ("LOOKUP_FAILED", StatusCode::BAD_GATEWAY),
            ApiError::Search(_) => ("SEARCH_FAILED", StatusCode::BAD_GATEWAY),
            ApiError::Validation(_) => ("VALIDATION_ERROR", StatusCode::BAD_REQUEST),
            ApiError::ExternalApi(e) => match e.status().map(|s| s.as_u16()) {
                Some(400..=499) => ("UPSTREAM_4XX", StatusCode::BAD_GATEWAY),
                Some(500..=599) => ("UPSTREAM_5XX", StatusCode::BAD_GATEWAY),
                _ => ("UPSTREAM_ERROR", StatusCode::BAD_GATEWAY),
            },
            ApiError::InvalidInput(_) => ("INVALID_INPUT", StatusCode::BAD_REQUEST),
            ApiError::NotFound(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, status) = self.code_and_status();

        let error_response = ErrorResponse {
            ok: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
