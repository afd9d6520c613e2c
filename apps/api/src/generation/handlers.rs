//! Axum route handlers for the Generation API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::SourceText;
use crate::generation::drafter::DraftResume;
use crate::generation::pipeline::{DocumentUpload, GenerationOutcome};
use crate::generation::roles::RoleRecord;
use crate::state::AppState;
use crate::usage::{self, Reservation};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Multipart body shared by the upload endpoints.
#[derive(Debug)]
pub struct GenerateForm {
    pub user_id: Uuid,
    pub upload: DocumentUpload,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitialResumeResponse {
    /// Draft text including its role verification list; send it back unchanged
    /// to the complete endpoint.
    pub initial_resume: String,
    pub original_text: String,
    pub reported_roles: Vec<RoleRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteResumeRequest {
    pub initial_resume: String,
    pub original_text: String,
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRolesRequest {
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeRolesResponse {
    pub total: usize,
    pub roles: Vec<RoleRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/generate
///
/// Full pipeline over an uploaded file. Metered as one generation, also when
/// the result is degraded.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerationOutcome>, AppError> {
    let form = read_generate_form(multipart).await?;
    let reservation = usage::reserve_generation(
        &state.db,
        form.user_id,
        "full",
        form.job_description.is_some(),
    )
    .await?;

    let result = state
        .pipeline
        .run(form.upload, form.job_description.as_deref())
        .await;
    let outcome = settle(&state.db, reservation, result, |o| o.degraded).await?;

    Ok(Json(outcome))
}

/// POST /api/v1/resumes/generate/initial
///
/// Pass 1 of the split flow. This call carries the metering for both passes.
pub async fn handle_generate_initial(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<InitialResumeResponse>, AppError> {
    let form = read_generate_form(multipart).await?;
    let reservation = usage::reserve_generation(
        &state.db,
        form.user_id,
        "initial",
        form.job_description.is_some(),
    )
    .await?;

    let result = async {
        let source = state.pipeline.extract(form.upload).await?;
        let draft = state
            .pipeline
            .draft(&source, form.job_description.as_deref())
            .await?;
        Ok::<_, AppError>((source, draft))
    }
    .await;
    let (source, draft) = settle(&state.db, reservation, result, |_| false).await?;

    Ok(Json(InitialResumeResponse {
        reported_roles: draft.grounded_roles(&source),
        initial_resume: draft.into_string(),
        original_text: source.as_str().to_string(),
    }))
}

/// POST /api/v1/resumes/generate/complete
///
/// Pass 2 of the split flow. Same degradation policy as the full pipeline.
pub async fn handle_generate_complete(
    State(state): State<AppState>,
    Json(request): Json<CompleteResumeRequest>,
) -> Result<Json<GenerationOutcome>, AppError> {
    if request.initial_resume.trim().is_empty() {
        return Err(AppError::Validation(
            "initial_resume cannot be empty".to_string(),
        ));
    }
    let source = SourceText::new(request.original_text)?;
    let draft = DraftResume::new(request.initial_resume);

    let outcome = state
        .pipeline
        .complete(&draft, &source, request.job_description.as_deref())
        .await;
    Ok(Json(outcome))
}

/// POST /api/v1/roles/analyze
pub async fn handle_analyze_roles(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRolesRequest>,
) -> Result<Json<AnalyzeRolesResponse>, AppError> {
    let source = SourceText::new(request.resume_text)?;
    let roles = state.pipeline.analyze_roles(&source).await?;
    Ok(Json(AnalyzeRolesResponse {
        total: roles.len(),
        roles,
    }))
}

/// Finalises a reservation from the run's result and passes the result through.
/// Metering bookkeeping never turns a generated resume into an error.
async fn settle<T>(
    db: &PgPool,
    reservation: Reservation,
    result: Result<T, AppError>,
    degraded: impl FnOnce(&T) -> bool,
) -> Result<T, AppError> {
    match &result {
        Ok(value) => usage::complete_generation(db, reservation, degraded(value)).await,
        Err(_) => usage::release_generation(db, reservation).await,
    }
    result
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart
// ────────────────────────────────────────────────────────────────────────────

async fn read_generate_form(mut multipart: Multipart) -> Result<GenerateForm, AppError> {
    let mut user_id = None;
    let mut upload = None;
    let mut job_description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => {
                let raw = field_text(field).await?;
                let id = raw.trim().parse::<Uuid>().map_err(|_| {
                    AppError::Validation(format!("user_id is not a valid UUID: {raw}"))
                })?;
                user_id = Some(id);
            }
            "resume" => {
                let mime_type = field.content_type().unwrap_or_default().to_string();
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read resume file: {e}")))?;
                info!(
                    "Received resume upload: {} bytes, type '{}'",
                    bytes.len(),
                    mime_type
                );
                upload = Some(DocumentUpload {
                    bytes,
                    mime_type,
                    file_name,
                });
            }
            "jobDescription" | "job_description" => {
                let text = field_text(field).await?;
                job_description = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }

    Ok(GenerateForm {
        user_id: user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?,
        upload: upload
            .ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?,
        job_description,
    })
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))
}
