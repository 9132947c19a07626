use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Every failure a handler can surface. Messages on the client-facing
/// variants are shown to the caller verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A user creating a second profile. Reported as a bad request.
    #[error("{0}")]
    ProfileExists(String),

    #[error("Invalid or expired OTP")]
    InvalidOrExpired,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Unexpected failure with full context chain
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ProfileExists(_) | ApiError::InvalidOrExpired | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe message, without leaking internal details
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Map a storage error to `duplicate` when it is a lost uniqueness race.
    pub fn on_unique(err: anyhow::Error, duplicate: ApiError) -> Self {
        if pitchlink_db::is_unique_violation(&err) {
            duplicate
        } else {
            ApiError::Internal(err)
        }
    }

    pub fn conflict_on_unique(err: anyhow::Error, message: &str) -> Self {
        Self::on_unique(err, ApiError::Conflict(message.to_string()))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {e}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            ApiError::Validation(e.body_text())
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::Validation(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(e) => tracing::error!("Internal error: {:#}", e),
            ApiError::Unauthorized(_) | ApiError::Forbidden(_) => {
                tracing::info!("Authorization error: {}", self)
            }
            ApiError::Conflict(_) | ApiError::ProfileExists(_) => tracing::warn!("Conflict: {}", self),
            _ => tracing::debug!("Client error: {}", self),
        }

        let status = self.status_code();
        (status, Json(json!({ "detail": self.user_message() }))).into_response()
    }
}
