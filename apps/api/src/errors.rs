use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::{FailureKind, LlmError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    InsufficientSourceText(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    ExtractionFailed(String),

    #[error("Provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Provider rejected credentials: {0}")]
    InvalidCredential(String),

    #[error("Provider rate limited: {0}")]
    RateLimited(String),

    #[error("Completion timed out: {0}")]
    CompletionTimeout(String),

    #[error("All completion models failed: {0}")]
    CompletionProviderExhausted(String),

    #[error("Usage limit reached: {0}")]
    UsageLimitReached(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        let message = e.to_string();
        match e {
            ExtractionError::UnsupportedFormat(_) => AppError::UnsupportedFormat(format!(
                "{message}. Please upload a PDF or DOCX file."
            )),
            ExtractionError::Failed(_) => AppError::ExtractionFailed(message),
            ExtractionError::InsufficientText { .. } => AppError::InsufficientSourceText(message),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        let message = e.to_string();
        match e.kind() {
            FailureKind::QuotaExceeded => AppError::QuotaExceeded(message),
            FailureKind::InvalidCredential => AppError::InvalidCredential(message),
            FailureKind::RateLimited => AppError::RateLimited(message),
            FailureKind::Timeout => AppError::CompletionTimeout(message),
            FailureKind::Other => AppError::CompletionProviderExhausted(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InsufficientSourceText(msg) => (
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_SOURCE_TEXT",
                msg.clone(),
            ),
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                msg.clone(),
            ),
            AppError::ExtractionFailed(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                msg.clone(),
            ),
            AppError::QuotaExceeded(msg) => {
                tracing::error!("Completion quota exceeded: {msg}");
                (
                    StatusCode::PAYMENT_REQUIRED,
                    "PROVIDER_QUOTA_EXCEEDED",
                    "The AI provider quota has been exceeded. Please try again later.".to_string(),
                )
            }
            AppError::InvalidCredential(msg) => {
                tracing::error!("Completion credential rejected: {msg}");
                (
                    StatusCode::UNAUTHORIZED,
                    "PROVIDER_INVALID_CREDENTIAL",
                    "The AI provider rejected the configured API key.".to_string(),
                )
            }
            AppError::RateLimited(msg) => {
                tracing::error!("Completion rate limited: {msg}");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "PROVIDER_RATE_LIMITED",
                    "The AI provider is rate limiting requests. Please retry shortly.".to_string(),
                )
            }
            AppError::CompletionTimeout(msg) => {
                tracing::error!("Completion timed out: {msg}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "COMPLETION_TIMEOUT",
                    "The AI provider did not respond in time.".to_string(),
                )
            }
            AppError::CompletionProviderExhausted(msg) => {
                tracing::error!("Completion providers exhausted: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "COMPLETION_PROVIDER_EXHAUSTED",
                    "Resume generation failed on every available model.".to_string(),
                )
            }
            AppError::UsageLimitReached(msg) => {
                (StatusCode::FORBIDDEN, "USAGE_LIMIT_REACHED", msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
