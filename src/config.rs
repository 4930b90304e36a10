use anyhow::{Result, anyhow};
use std::env;
use tracing::info;

/// Complete application configuration loaded once at startup from
/// environment variables. Components receive their section by reference
/// instead of reading the environment at call time.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Gemini API configuration. A missing key is not a startup error: the
/// generator reports it per request so the server can still come up.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

/// Tesseract CLI configuration
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub command: String,
    pub language: Option<String>,
}

/// Logging system configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            server: ServerConfig::from_env()?,
            llm: LlmConfig::from_env(),
            ocr: OcrConfig::from_env(),
            logging: LoggingConfig::from_env(),
        })
    }

    /// Log a summary of loaded configuration (without sensitive data)
    pub fn log_summary(&self) {
        info!(
            server_address = %format!("{}:{}", self.server.host, self.server.port),
            gemini_model = %self.llm.model,
            api_key_masked = %self
                .llm
                .api_key
                .as_deref()
                .map(mask_sensitive_data)
                .unwrap_or_else(|| "<not set>".to_string()),
            ocr_command = %self.ocr.command,
            log_level = %self.logging.level,
            "Configuration summary"
        );
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than 0"));
        }

        if self.llm.api_key.is_none() {
            tracing::warn!(
                "GOOGLE_API_KEY is not set - flashcard generation will fail until it is provided"
            );
        }

        Ok(())
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "8000".to_string());

        let port = port_str.parse::<u16>().map_err(|_| {
            anyhow!(
                "Invalid PORT value: '{}'. Must be a number between 1-65535",
                port_str
            )
        })?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(ServerConfig { host, port })
    }
}

impl LlmConfig {
    fn from_env() -> Self {
        let api_key = env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty());

        let base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        LlmConfig {
            api_key,
            base_url,
            model,
        }
    }
}

impl OcrConfig {
    fn from_env() -> Self {
        // TESSERACT_CMD points at the binary when it is not on PATH
        let command = env::var("TESSERACT_CMD").unwrap_or_else(|_| "tesseract".to_string());
        let language = env::var("TESSERACT_LANG").ok().filter(|l| !l.is_empty());

        OcrConfig { command, language }
    }
}

impl LoggingConfig {
    fn from_env() -> Self {
        let level =
            env::var("RUST_LOG").unwrap_or_else(|_| "info,flashcard_generator=debug".to_string());

        let file_enabled = env::var("LOG_FILE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let console_enabled = env::var("LOG_CONSOLE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let log_directory = env::var("LOG_DIRECTORY").unwrap_or_else(|_| "logs".to_string());

        LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        }
    }
}

/// Mask sensitive data in configuration for safe logging
fn mask_sensitive_data(data: &str) -> String {
    if data.len() <= 8 {
        "*".repeat(data.len())
    } else {
        format!("{}***{}", &data[..4], &data[data.len() - 4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_mask_sensitive_data() {
        assert_eq!(mask_sensitive_data("short"), "*****");
        assert_eq!(mask_sensitive_data("AIzaSyA-1234567890"), "AIza***7890");
    }

    // Single test for everything touching PORT/HOST; tests run in parallel
    // and these share process environment.
    #[test]
    fn test_server_config_parsing() {
        unsafe {
            env::remove_var("PORT");
            env::remove_var("HOST");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");

        unsafe {
            env::set_var("PORT", "not-a-number");
        }
        assert!(ServerConfig::from_env().is_err());

        unsafe {
            env::remove_var("PORT");
        }
    }

    #[test]
    fn test_llm_config_defaults() {
        unsafe {
            env::remove_var("GEMINI_BASE_URL");
            env::remove_var("GEMINI_MODEL");
        }

        let config = LlmConfig::from_env();
        assert_eq!(
            config.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_ocr_config_defaults() {
        unsafe {
            env::remove_var("TESSERACT_CMD");
            env::remove_var("TESSERACT_LANG");
        }

        let config = OcrConfig::from_env();
        assert_eq!(config.command, "tesseract");
        assert_eq!(config.language, None);
    }

    #[test]
    fn test_config_validation_rejects_zero_port() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 0,
            },
            llm: LlmConfig {
                api_key: Some("test-key".to_string()),
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-2.0-flash".to_string(),
            },
            ocr: OcrConfig {
                command: "tesseract".to_string(),
                language: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_enabled: true,
                console_enabled: true,
                log_directory: "logs".to_string(),
            },
        };

        assert!(config.validate().is_err());
    }
}
