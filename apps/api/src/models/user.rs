use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    /// FREE, PRO or BUSINESS.
    pub tier: String,
    pub created_at: DateTime<Utc>,
}
