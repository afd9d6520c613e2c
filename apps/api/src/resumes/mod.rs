// Saved resumes: CRUD scoped to a user, edits bump `version`, deletes are soft.

pub mod handlers;
pub mod repository;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub source_text: Option<String>,
    pub job_description: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub metadata: Option<Value>,
}

/// A create request after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResume {
    pub title: String,
    pub content: String,
    pub source_text: Option<String>,
    pub job_description: Option<String>,
    pub metadata: Value,
}

/// An update request after validation. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Shallow-merged into the stored metadata.
    pub metadata: Value,
}

pub fn validate_create(req: CreateResumeRequest) -> Result<NewResume, AppError> {
    let title = req.title.trim().to_string();
    if title.is_empty() || req.content.trim().is_empty() {
        return Err(AppError::Validation(
            "Title and content are required".to_string(),
        ));
    }

    let mut metadata = metadata_object(req.metadata)?;
    metadata
        .entry("created_at")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

    Ok(NewResume {
        title,
        content: req.content,
        source_text: req.source_text,
        job_description: req.job_description.filter(|jd| !jd.trim().is_empty()),
        metadata: Value::Object(metadata),
    })
}

pub fn validate_update(req: UpdateResumeRequest) -> Result<ResumeChanges, AppError> {
    if req.title.is_none() && req.content.is_none() && req.metadata.is_none() {
        return Err(AppError::Validation(
            "Nothing to update: supply title, content or metadata".to_string(),
        ));
    }

    let title = match req.title {
        Some(t) if t.trim().is_empty() => {
            return Err(AppError::Validation("Title cannot be empty".to_string()))
        }
        Some(t) => Some(t.trim().to_string()),
        None => None,
    };
    if req.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::Validation("Content cannot be empty".to_string()));
    }

    Ok(ResumeChanges {
        title,
        content: req.content,
        metadata: Value::Object(metadata_object(req.metadata)?),
    })
}

fn metadata_object(metadata: Option<Value>) -> Result<Map<String, Value>, AppError> {
    match metadata {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(AppError::Validation(
            "metadata must be a JSON object".to_string(),
        )),
    }
}
