//! Error types for the explainer server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use arcring_ring::RingError;

/// Result type for explainer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving the explainer.
#[derive(Debug, Error)]
pub enum Error {
    /// The ring rejected the operation
    #[error("Ring error: {0}")]
    Ring(#[from] RingError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Ring(RingError::PositionOutOfRange(_)) | Error::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Ring(RingError::UnknownKey(_)) => StatusCode::NOT_FOUND,
            Error::Ring(RingError::EmptyRing) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Serialization(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(%status, error = %self, "request rejected");
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_errors_map_to_client_statuses() {
        assert_eq!(Error::from(RingError::EmptyRing).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            Error::from(RingError::PositionOutOfRange(400)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidInput("name and position".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
