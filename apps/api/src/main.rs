mod config;
mod db;
mod document;
mod errors;
mod extraction;
mod generation;
mod llm_client;
mod models;
mod resumes;
mod routes;
mod state;
mod usage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::DocumentTextExtractor;
use crate::generation::pipeline::ReconciliationPipeline;
use crate::generation::settings::GenerationSettings;
use crate::llm_client::openai::OpenAiProvider;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let provider = OpenAiProvider::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.llm_timeout,
    )?;
    let llm = LlmClient::new(
        Arc::new(provider),
        config.llm_models.clone(),
        config.llm_timeout,
    );
    info!(
        "LLM client initialized (models: {}, timeout: {}s)",
        llm.models().join(" -> "),
        config.llm_timeout.as_secs()
    );

    let settings = GenerationSettings {
        strategy: config.reconcile_strategy,
        ..GenerationSettings::default()
    };
    info!("Reconcile strategy: {:?}", settings.strategy);
    let pipeline = ReconciliationPipeline::new(Arc::new(DocumentTextExtractor), llm, settings);

    // Build app state
    let state = AppState {
        db,
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
