use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use talent_scout::api::{self, AppServices};
use talent_scout::config::AppConfig;
use talent_scout::documents::{DocumentParser, ParserConfig, TextExtractor};
use talent_scout::llm::create_provider;
use talent_scout::screening::{OrchestratorConfig, ScreeningOrchestrator};
use talent_scout::store::LibSqlBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real env vars still apply.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let (file_layer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "talent-scout.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    let llm = create_provider(&config.llm).context("Failed to create LLM provider")?;

    let store = LibSqlBackend::new_local(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;

    let orchestrator = ScreeningOrchestrator::new(
        Arc::clone(&llm),
        OrchestratorConfig {
            history_window: config.history_window,
            ..OrchestratorConfig::default()
        },
    );
    let parser = DocumentParser::new(llm, text_extractor(), ParserConfig::default());

    let app = api::router(AppServices {
        orchestrator: Arc::new(orchestrator),
        parser: Arc::new(parser),
        store: Arc::new(store),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Talent Scout listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(feature = "office-documents")]
fn text_extractor() -> Arc<dyn TextExtractor> {
    Arc::new(talent_scout::documents::OfficeTextExtractor)
}

/// PDF and DOCX uploads answer 501 in this build.
#[cfg(not(feature = "office-documents"))]
fn text_extractor() -> Arc<dyn TextExtractor> {
    Arc::new(talent_scout::documents::PlainTextExtractor)
}
