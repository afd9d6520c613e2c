use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A saved resume. Rows are never removed; deletion sets `is_deleted`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub source_text: Option<String>,
    pub job_description: Option<String>,
    /// Free-form: job_title, company, name, created_at.
    pub metadata: Value,
    pub version: i32,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing view: everything except the (large) text columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub metadata: Value,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
