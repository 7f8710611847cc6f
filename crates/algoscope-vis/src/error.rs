//! Error types for the visualization server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use algoscope_graph::EditError;

/// Result type for session and server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a visualization.
#[derive(Debug, Error)]
pub enum Error {
    /// Input change attempted while a producer is active
    #[error("Pause or reset the visualization before changing its input.")]
    Busy,

    /// Rejected user input, or nothing to act on
    #[error(transparent)]
    Input(#[from] algoscope_steps::Error),

    /// Rejected graph edit
    #[error(transparent)]
    Edit(#[from] EditError),

    /// The operation does not exist for this kind of visualization
    #[error("{0}")]
    Unsupported(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Busy => StatusCode::CONFLICT,
            Error::Input(algoscope_steps::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Error::Input(algoscope_steps::Error::NotApplicable(_)) => StatusCode::CONFLICT,
            Error::Edit(EditError::Locked) => StatusCode::CONFLICT,
            Error::Edit(_) | Error::Unsupported(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
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
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Error::Busy.status(), StatusCode::CONFLICT);
        assert_eq!(
            Error::from(algoscope_steps::Error::invalid("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::from(algoscope_steps::Error::not_applicable("empty")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(Error::from(EditError::Locked).status(), StatusCode::CONFLICT);
        assert_eq!(Error::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn input_errors_keep_their_message() {
        let err = Error::from(algoscope_steps::Error::invalid("Target must be a whole number."));
        assert_eq!(err.to_string(), "Target must be a whole number.");
    }
}
