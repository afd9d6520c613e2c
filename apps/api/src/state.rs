use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::generation::pipeline::ReconciliationPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Built once at startup; owns the completion client and text extractor.
    pub pipeline: Arc<ReconciliationPipeline>,
    pub config: Config,
}
