pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::resumes::handlers as resumes;
use crate::state::AppState;
use crate::usage::handlers as usage;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Generation
        .route(
            "/api/v1/resumes/generate",
            post(generation::handle_generate).layer(upload_limit),
        )
        .route(
            "/api/v1/resumes/generate/initial",
            post(generation::handle_generate_initial).layer(upload_limit),
        )
        .route(
            "/api/v1/resumes/generate/complete",
            post(generation::handle_generate_complete),
        )
        .route("/api/v1/roles/analyze", post(generation::handle_analyze_roles))
        // Saved resumes
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route("/api/v1/resumes/structure", post(resumes::handle_structure))
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        // Plan and usage
        .route("/api/v1/users/:id/usage", get(usage::handle_get_usage))
        .with_state(state)
}
