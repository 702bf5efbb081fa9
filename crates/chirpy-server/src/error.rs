//! Mapping core errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use chirpy_core::{ChirpyError, ErrorKind};

/// Error returned by every handler
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] ChirpyError),

    /// The request itself could not be decoded
    #[error("{0}")]
    BadRequest(String),

    /// A blocking task panicked or was cancelled
    #[error("internal error")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::EmailTaken => StatusCode::CONFLICT,
                ErrorKind::NotAuthor => StatusCode::FORBIDDEN,
                ErrorKind::ValidationEmpty | ErrorKind::ValidationTooLong => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // The response only says "internal error"; the cause goes to the log
            let cause = std::error::Error::source(&self).map(ToString::to_string);
            tracing::error!(error = %self, cause = ?cause, "request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
