use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::generator::GeneratorError;

/// Wire format for every non-2xx response: `{"detail": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Centralized error types for the generation endpoint
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No image file provided.")]
    EmptyUpload,

    #[error("Could not extract any text from the image.")]
    NoTextExtracted,

    #[error("AI model failed to generate flashcards.")]
    GenerationFailed,

    #[error("{0}")]
    Configuration(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Convert to an HTTP response with consistent structure and logging
    pub fn to_response(self) -> (StatusCode, Json<ErrorDetail>) {
        let status = match &self {
            ApiError::EmptyUpload | ApiError::NoTextExtracted => {
                warn!(error = %self, "Rejecting request with client error");
                StatusCode::BAD_REQUEST
            }
            ApiError::Configuration(_) => {
                error!(error = %self, "Configuration error while handling request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::GenerationFailed | ApiError::Unexpected(_) => {
                error!(error = %self, "Request failed with server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorDetail {
                detail: self.to_string(),
            }),
        )
    }
}

impl From<GeneratorError> for ApiError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::MissingApiKey => ApiError::Configuration(err.to_string()),
        }
    }
}
