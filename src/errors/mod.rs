use std::io;
use axum::{http::StatusCode, response::{IntoResponse, Response}};

/// Error types for the wiki application
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("not found")]
    NotFound,
    #[error("invalid title")]
    InvalidTitle,
    #[error("{0}")]
    Template(String),
    /// Request payload the server refused to read
    #[error("{1}")]
    Rejected(StatusCode, String),
}

impl WikiError {
    pub fn status(&self) -> StatusCode {
        match self {
            WikiError::NotFound | WikiError::InvalidTitle => StatusCode::NOT_FOUND,
            WikiError::Io(_) | WikiError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WikiError::Rejected(status, _) => *status,
        }
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            // Bad titles and missing files look the same from outside
            WikiError::NotFound | WikiError::InvalidTitle => {
                (StatusCode::NOT_FOUND, "404 page not found\n").into_response()
            }
            WikiError::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}\n", e),
            )
                .into_response(),
            WikiError::Template(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}\n", e),
            )
                .into_response(),
            WikiError::Rejected(status, text) => (status, format!("{}\n", text)).into_response(),
        }
    }
}
