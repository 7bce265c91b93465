use actix_web::{error, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::core::ScreeningError;
use crate::models::ErrorResponse;
use crate::services::StoreError;

/// Client message returned when a body fails the profanity screen
pub const CONTENT_REJECTED_MESSAGE: &str = "tsk tsk! naughty naughty! someone has a potty mouth!";

/// Errors surfaced by request handlers
///
/// Internal details are logged where the error is created and never sent
/// to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid administrative credentials")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{}", CONTENT_REJECTED_MESSAGE)]
    ContentRejected,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidJson(_) => "invalid_json",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Unauthorized => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::ContentRejected => "content_rejected",
            ApiError::Internal => "internal_error",
        }
    }
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ContentRejected => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict(what) => ApiError::Conflict(what),
            other => {
                tracing::error!("Store failure: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<ScreeningError> for ApiError {
    fn from(err: ScreeningError) -> Self {
        tracing::error!("Profanity screen failed: {}", err);
        ApiError::Internal
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl From<error::BlockingError> for ApiError {
    fn from(err: error::BlockingError) -> Self {
        tracing::error!("Blocking task failed: {}", err);
        ApiError::Internal
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {} {}: {}", req.method(), req.path(), err);
    ApiError::InvalidJson(err.to_string()).into()
}
