use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::LlmConfig;
use crate::llm_providers::{GeminiProvider, ModelClient};
use crate::models::Flashcard;

/// Errors the generator propagates to the handler. Everything else (network
/// failures, malformed model output) degrades to an empty card list.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("GOOGLE_API_KEY not found in environment variables.")]
    MissingApiKey,
}

/// Tagged result of parsing a raw model response. The HTTP boundary cannot
/// tell an empty-but-valid `[]` from garbage output (both surface as the
/// generic AI failure), but tests and logs can.
#[derive(Debug)]
pub enum GenerationOutcome {
    Generated(Vec<Flashcard>),
    Malformed { error: String },
}

/// Turns extracted text into flashcards via the injected model client.
#[derive(Clone)]
pub struct FlashcardGenerator {
    model: Option<Arc<dyn ModelClient>>,
}

impl FlashcardGenerator {
    /// Build from startup configuration. A missing API key leaves the
    /// generator in place but makes every `generate` call fail with
    /// `GeneratorError::MissingApiKey`.
    pub fn from_config(config: &LlmConfig) -> Self {
        let model = config
            .api_key
            .clone()
            .map(|key| Arc::new(GeminiProvider::new(key, config)) as Arc<dyn ModelClient>);

        Self { model }
    }

    /// Build with an explicit model client (used by tests)
    pub fn with_model(model: Arc<dyn ModelClient>) -> Self {
        Self { model: Some(model) }
    }

    /// Generate flashcards from extracted text. Returns an empty list on any
    /// upstream or parse failure; only the missing credential is an error.
    pub async fn generate(&self, text: &str) -> Result<Vec<Flashcard>, GeneratorError> {
        let Some(model) = &self.model else {
            return Err(GeneratorError::MissingApiKey);
        };

        info!(text_length = text.len(), "Generating flashcards from text");

        let prompt = build_prompt(text);

        let raw_response = match model.generate_content(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Model request failed, returning no flashcards");
                return Ok(Vec::new());
            }
        };

        debug!(response = %raw_response, "Raw model response");

        match parse_flashcards(&raw_response) {
            GenerationOutcome::Generated(flashcards) => {
                info!(
                    flashcard_count = flashcards.len(),
                    "Parsed flashcards from model response"
                );
                Ok(flashcards)
            }
            GenerationOutcome::Malformed { error } => {
                error!(
                    error = %error,
                    raw_response = %raw_response,
                    "Failed to parse model response as flashcard JSON"
                );
                Ok(Vec::new())
            }
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        r#"Based on the following text, generate a list of flashcards.
Each flashcard should be a JSON object with a "question" and an "answer" key.
Return your response as a valid JSON array of these objects. Do not include any other text or explanations.

Here is an example of the desired output format:
[
    {{
        "question": "What is the powerhouse of the cell?",
        "answer": "The mitochondria."
    }},
    {{
        "question": "What is the formula for water?",
        "answer": "H2O."
    }}
]

Here is the text to analyze:
---
{}
---"#,
        text
    )
}

/// Remove the literal code-fence markers models like to wrap JSON in.
fn strip_code_fences(raw: &str) -> String {
    raw.trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a raw model response into flashcards, tagging parse failures
pub fn parse_flashcards(raw: &str) -> GenerationOutcome {
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<Vec<Flashcard>>(&cleaned) {
        Ok(flashcards) => GenerationOutcome::Generated(flashcards),
        Err(e) => GenerationOutcome::Malformed {
            error: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct FixedModel(String);

    #[async_trait]
    impl ModelClient for FixedModel {
        async fn generate_content(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ModelClient for FailingModel {
        async fn generate_content(&self, _prompt: &str) -> Result<String> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("  [] "), "[]");
        assert_eq!(strip_code_fences("```\n[]\n```"), "[]");
    }

    #[test]
    fn test_parse_fenced_response() {
        let raw = "```json\n[{\"question\":\"Q1\",\"answer\":\"A1\"}]\n```";
        match parse_flashcards(raw) {
            GenerationOutcome::Generated(cards) => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].question, "Q1");
                assert_eq!(cards[0].answer, "A1");
            }
            GenerationOutcome::Malformed { error } => panic!("expected cards, got: {}", error),
        }
    }

    #[test]
    fn test_parse_distinguishes_empty_array_from_garbage() {
        // Both collapse to "empty" at the HTTP boundary, but the outcome
        // keeps them apart.
        assert!(matches!(
            parse_flashcards("[]"),
            GenerationOutcome::Generated(cards) if cards.is_empty()
        ));
        assert!(matches!(
            parse_flashcards("[\"not valid json"),
            GenerationOutcome::Malformed { .. }
        ));
    }

    #[test]
    fn test_prompt_embeds_text_verbatim() {
        let prompt = build_prompt("Mitochondria are organelles.");
        assert!(prompt.contains("Mitochondria are organelles."));
        assert!(prompt.contains("\"question\""));
        assert!(prompt.contains("\"answer\""));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_an_error() {
        let generator = FlashcardGenerator::from_config(&LlmConfig {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
        });

        let err = generator.generate("some text").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "GOOGLE_API_KEY not found in environment variables."
        );
    }

    #[tokio::test]
    async fn test_malformed_response_degrades_to_empty() {
        let generator =
            FlashcardGenerator::with_model(Arc::new(FixedModel("[\"not valid json".to_string())));
        let cards = generator.generate("some text").await.unwrap();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_degrades_to_empty() {
        let generator = FlashcardGenerator::with_model(Arc::new(FailingModel));
        let cards = generator.generate("some text").await.unwrap();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn test_fenced_response_produces_cards() {
        let generator = FlashcardGenerator::with_model(Arc::new(FixedModel(
            "```json\n[{\"question\":\"Q1\",\"answer\":\"A1\"}]\n```".to_string(),
        )));
        let cards = generator.generate("some text").await.unwrap();
        assert_eq!(
            cards,
            vec![Flashcard {
                question: "Q1".to_string(),
                answer: "A1".to_string(),
            }]
        );
    }
}
