use anyhow::Result;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use flashcard_generator::{
    api::{AppState, create_router},
    config::{Config, LoggingConfig},
    generator::FlashcardGenerator,
    ocr::TesseractOcr,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let _guard = setup_logging(&config.logging)?;

    config.log_summary();
    config.validate()?;

    info!("Starting Flashcard Generator API server...");

    let state = AppState {
        ocr: Arc::new(TesseractOcr::new(&config.ocr)),
        generator: FlashcardGenerator::from_config(&config.llm),
    };

    // Permissive cross-origin defaults so a web frontend on another domain
    // can call this backend. Restrict before exposing publicly.
    let app = create_router(state)
        .layer(ServiceBuilder::new().layer(CorsLayer::very_permissive()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let console_layer = config.console_enabled.then(|| {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
    });

    // File output uses daily rotation without ANSI colors
    let (file_layer, guard) = if config.file_enabled {
        std::fs::create_dir_all(&config.log_directory).unwrap_or_else(|e| {
            eprintln!("Warning: Could not create logs directory: {}", e);
        });

        let file_appender =
            tracing_appender::rolling::daily(&config.log_directory, "flashcard-generator.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(non_blocking_file);

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");

    Ok(guard)
}
