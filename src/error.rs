use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::{ERR_EMPTY_FILENAME, ERR_FILE_NOT_FOUND, ERR_NO_FILE_PART};

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("No file part in request")]
    MissingFilePart,

    #[error("Empty file name")]
    EmptyFileName,

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("File not found")]
    FileNotFound,
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Io(ref e) => {
                tracing::error!("I/O error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Multipart(ref e) => {
                tracing::warn!("Rejected multipart body: {}", e);
                (e.status(), e.body_text())
            }
            AppError::MissingFilePart => (StatusCode::BAD_REQUEST, ERR_NO_FILE_PART.to_string()),
            AppError::EmptyFileName => (StatusCode::BAD_REQUEST, ERR_EMPTY_FILENAME.to_string()),
            AppError::InvalidFileName(ref reason) => (
                StatusCode::BAD_REQUEST,
                format!("invalid filename: {}", reason),
            ),
            AppError::FileNotFound => (StatusCode::NOT_FOUND, ERR_FILE_NOT_FOUND.to_string()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
