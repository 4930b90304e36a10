use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::OcrConfig;

/// Seam between the request handler and the OCR backend. Tests inject a
/// canned implementation here instead of shelling out to Tesseract.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract text from raw image bytes. Failures degrade to an empty
    /// string; the handler treats empty output as "no text in the image".
    async fn extract_text(&self, image_bytes: &[u8]) -> String;
}

/// Tesseract-backed extractor. Decodes the upload with the `image` crate,
/// writes a temporary PNG, and runs the `tesseract` CLI with stdout output.
pub struct TesseractOcr {
    command: String,
    language: Option<String>,
}

impl TesseractOcr {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            command: config.command.clone(),
            language: config.language.clone(),
        }
    }

    async fn run_tesseract(&self, image_bytes: &[u8]) -> Result<String> {
        let bytes = image_bytes.to_vec();

        // Decode and re-encode off the async executor; uploads can be large.
        let temp_image = tokio::task::spawn_blocking(move || -> Result<NamedTempFile> {
            let image = image::load_from_memory(&bytes).context("failed to decode image bytes")?;

            let file = tempfile::Builder::new()
                .prefix("flashcard-ocr-")
                .suffix(".png")
                .tempfile()
                .context("failed to create temporary image file")?;

            image
                .save(file.path())
                .context("failed to write temporary PNG")?;

            Ok(file)
        })
        .await
        .context("image decoding task panicked")??;

        let mut command = Command::new(&self.command);
        command.arg(temp_image.path()).arg("stdout");
        if let Some(language) = &self.language {
            command.arg("-l").arg(language);
        }

        let output = command
            .output()
            .await
            .with_context(|| format!("failed to execute '{}'", self.command))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("tesseract exited with failure: {}", stderr.trim()));
        }

        let text = String::from_utf8(output.stdout).context("tesseract produced invalid UTF-8")?;

        debug!(
            text_length = text.len(),
            "Tesseract extraction completed"
        );

        Ok(text)
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn extract_text(&self, image_bytes: &[u8]) -> String {
        match self.run_tesseract(image_bytes).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "OCR failed, returning empty text");
                String::new()
            }
        }
    }
}
