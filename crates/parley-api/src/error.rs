use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// User-visible failures carry a short reason string and map onto the
/// documented status codes; bad credentials answer 400 like every other
/// rejected request. Internal faults are logged and never leak detail.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest(reason.into())
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound(reason.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized(reason) | Self::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, reason).into_response()
            }
            Self::NotFound(reason) => (StatusCode::NOT_FOUND, reason).into_response(),
            Self::Internal(e) => {
                error!("Internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

/// Flatten a `spawn_blocking` join result into an `ApiError`.
pub fn blocking<T>(
    result: Result<anyhow::Result<T>, tokio::task::JoinError>,
) -> Result<T, ApiError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ApiError::Internal(e)),
        Err(e) => Err(ApiError::Internal(anyhow::anyhow!("join error: {e}"))),
    }
}
