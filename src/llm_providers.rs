use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::LlmConfig;

/// Seam between the flashcard generator and the hosted model. Tests inject
/// canned responses here instead of calling the Gemini API.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send a prompt and return the model's raw text response.
    async fn generate_content(&self, prompt: &str) -> Result<String>;
}

/// Gemini provider implementation
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

/// Gemini-specific request structures
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "topK")]
    top_k: i32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

impl GeminiProvider {
    pub fn new(api_key: String, config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelClient for GeminiProvider {
    async fn generate_content(&self, prompt: &str) -> Result<String> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.9,
                max_output_tokens: 2048,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        info!(
            model = %self.model,
            base_url = %self.base_url,
            prompt_length = prompt.len(),
            "Making Gemini request"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                "Gemini API request failed"
            );
            return Err(anyhow::anyhow!(
                "Gemini API request failed: {}",
                error_text
            ));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        if gemini_response.candidates.is_empty() {
            return Err(anyhow::anyhow!("No candidates in Gemini response"));
        }

        if gemini_response.candidates[0].content.parts.is_empty() {
            return Err(anyhow::anyhow!("No parts in Gemini response"));
        }

        let response_content = gemini_response.candidates[0].content.parts[0].text.clone();
        info!(
            response_length = response_content.len(),
            "Successfully received Gemini response"
        );

        Ok(response_content)
    }
}
