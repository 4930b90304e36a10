use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    errors::{ApiError, ErrorDetail},
    generator::FlashcardGenerator,
    models::FlashcardResponse,
    ocr::OcrEngine,
};

// Uploads are raster images; axum's 2 MB default is too small for photos.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub ocr: Arc<dyn OcrEngine>,
    pub generator: FlashcardGenerator,
}

pub async fn read_root() -> Json<Value> {
    Json(json!({"message": "Welcome to the Flashcard Generator API!"}))
}

/// Receive an image, extract text with OCR, and generate flashcards.
pub async fn create_flashcards_from_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<FlashcardResponse>, (StatusCode, Json<ErrorDetail>)> {
    let image_bytes = read_image_field(multipart)
        .await
        .map_err(ApiError::to_response)?;
    if image_bytes.is_empty() {
        return Err(ApiError::EmptyUpload.to_response());
    }

    debug!(upload_size = image_bytes.len(), "Received image upload");

    let extracted_text = state.ocr.extract_text(&image_bytes).await;
    if extracted_text.trim().is_empty() {
        return Err(ApiError::NoTextExtracted.to_response());
    }

    debug!(
        text_length = extracted_text.len(),
        "Extracted text from image"
    );

    let flashcards = state
        .generator
        .generate(&extracted_text)
        .await
        .map_err(|e| ApiError::from(e).to_response())?;

    if flashcards.is_empty() {
        return Err(ApiError::GenerationFailed.to_response());
    }

    info!(
        flashcard_count = flashcards.len(),
        "Flashcards generated successfully"
    );

    Ok(Json(FlashcardResponse { flashcards }))
}

/// Pull the bytes of the `file` field out of the multipart form. A form
/// without that field is treated the same as an empty upload.
async fn read_image_field(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Unexpected(e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Unexpected(e.to_string()))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::EmptyUpload)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/generate-flashcards/", post(create_flashcards_from_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
