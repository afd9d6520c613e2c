use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{usage_summary, UsageSummary};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/users/:id/usage
pub async fn handle_get_usage(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UsageSummary>, AppError> {
    Ok(Json(usage_summary(&state.db, user_id).await?))
}
