use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{parse_with, serialize, AssembleOptions, ResumeStructured};
use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeSummaryRow};
use crate::resumes::repository::{
    create_resume, get_resume, list_resumes, soft_delete_resume, update_resume,
};
use crate::resumes::{validate_create, validate_update, CreateResumeRequest, UpdateResumeRequest};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StructureRequest {
    pub content: String,
    /// Overrides the server-wide ENFORCE_BULLET_ALLOCATION setting.
    pub enforce_allocation: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct StructureResponse {
    #[serde(flatten)]
    pub structured: ResumeStructured,
    /// The same resume re-rendered in the canonical section convention.
    pub canonical_text: String,
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeSummaryRow>>, AppError> {
    Ok(Json(list_resumes(&state.db, params.user_id).await?))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let user_id = req.user_id;
    let new = validate_create(req)?;
    let row = create_resume(&state.db, user_id, &new).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeRow>, AppError> {
    Ok(Json(get_resume(&state.db, params.user_id, id).await?))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    let user_id = req.user_id;
    let changes = validate_update(req)?;
    Ok(Json(update_resume(&state.db, user_id, id, &changes).await?))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    soft_delete_resume(&state.db, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/structure
///
/// Runs the Document Assembler over supplied text, for renderers.
pub async fn handle_structure(
    State(state): State<AppState>,
    Json(req): Json<StructureRequest>,
) -> Result<Json<StructureResponse>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    let options = AssembleOptions {
        enforce_allocation: req
            .enforce_allocation
            .unwrap_or(state.config.enforce_bullet_allocation),
    };
    let structured = parse_with(&req.content, options);
    Ok(Json(StructureResponse {
        canonical_text: serialize(&structured),
        structured,
    }))
}
