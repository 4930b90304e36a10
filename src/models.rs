use serde::{Deserialize, Serialize};

/// A single question/answer pair produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// Success envelope for the generation endpoint. Card order follows the
/// model's output order; duplicates are not filtered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardResponse {
    pub flashcards: Vec<Flashcard>,
}
