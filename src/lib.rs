pub mod api;
pub mod config;
pub mod errors;
pub mod generator;
pub mod llm_providers;
pub mod models;
pub mod ocr;

pub use config::Config;
pub use errors::{ApiError, ErrorDetail};
pub use generator::{FlashcardGenerator, GenerationOutcome, GeneratorError};
pub use llm_providers::{GeminiProvider, ModelClient};
pub use models::{Flashcard, FlashcardResponse};
pub use ocr::{OcrEngine, TesseractOcr};
