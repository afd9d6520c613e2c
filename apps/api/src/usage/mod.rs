//! Usage metering: subscription tiers and their monthly limits.
//!
//! One full pipeline run is one `generate_resume` event, whether it finished
//! cleanly or degraded to the initial draft. The event is reserved before the
//! run and deleted again if the run fails outright.

pub mod handlers;

use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::usage::UsageEventRow;
use crate::models::user::User;

pub const GENERATE_RESUME: &str = "generate_resume";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Business,
}

impl FromStr for Tier {
    type Err = std::convert::Infallible;

    /// Unknown tiers are treated as FREE.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "PRO" => Tier::Pro,
            "BUSINESS" => Tier::Business,
            _ => Tier::Free,
        })
    }
}

/// `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierLimits {
    pub monthly_generations: Option<u32>,
    pub max_saved_resumes: Option<u32>,
}

impl Tier {
    pub fn limits(self) -> TierLimits {
        match self {
            Tier::Free => TierLimits {
                monthly_generations: Some(2),
                max_saved_resumes: Some(5),
            },
            Tier::Pro | Tier::Business => TierLimits {
                monthly_generations: None,
                max_saved_resumes: None,
            },
        }
    }
}

/// Midnight UTC on the first day of `now`'s month.
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// True when one more use still fits under `limit`.
pub fn within_limit(used: i64, limit: Option<u32>) -> bool {
    match limit {
        Some(limit) => used < i64::from(limit),
        None => true,
    }
}

/// Errors when a user on `tier` with `saved` live resumes may not save another.
pub fn check_can_save(tier: Tier, saved: i64) -> Result<(), AppError> {
    let limit = tier.limits().max_saved_resumes;
    if within_limit(saved, limit) {
        Ok(())
    } else {
        Err(AppError::UsageLimitReached(format!(
            "The {:?} plan can keep at most {} saved resumes; delete one or upgrade",
            tier,
            limit.unwrap_or_default()
        )))
    }
}

/// Reads the user's tier and locks their row until `conn`'s transaction ends.
/// Limit checks that run under this lock cannot interleave for the same user.
pub async fn lock_user_tier(conn: &mut PgConnection, user_id: Uuid) -> Result<Tier, AppError> {
    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    Ok(user.tier.parse().unwrap_or_default())
}

pub async fn user_tier(db: &PgPool, user_id: Uuid) -> Result<Tier, AppError> {
    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    Ok(user.tier.parse().unwrap_or_default())
}

pub async fn monthly_generations<'e, E>(db: E, user_id: Uuid) -> Result<i64, AppError>
where
    E: PgExecutor<'e>,
{
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM usage_events WHERE user_id = $1 AND action = $2 AND created_at >= $3",
    )
    .bind(user_id)
    .bind(GENERATE_RESUME)
    .bind(start_of_month(Utc::now()))
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// A `generate_resume` event inserted before the pipeline runs. It counts
/// against the monthly limit from the moment it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub event_id: Uuid,
}

/// Checks the monthly limit and inserts the event in one transaction, under
/// the user's row lock.
pub async fn reserve_generation(
    db: &PgPool,
    user_id: Uuid,
    stage: &str,
    has_job_description: bool,
) -> Result<Reservation, AppError> {
    let mut tx = db.begin().await?;

    let tier = lock_user_tier(&mut *tx, user_id).await?;
    let limit = tier.limits().monthly_generations;
    let used = monthly_generations(&mut *tx, user_id).await?;
    if !within_limit(used, limit) {
        return Err(AppError::UsageLimitReached(format!(
            "You have used all {} resume generations included in the {:?} plan this month",
            limit.unwrap_or_default(),
            tier
        )));
    }

    let event: UsageEventRow = sqlx::query_as(
        "INSERT INTO usage_events (user_id, action, metadata) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(GENERATE_RESUME)
    .bind(generation_metadata(stage, "reserved", None, has_job_description))
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("Reserved generation {} for user {}", event.id, user_id);
    Ok(Reservation { event_id: event.id })
}

/// Marks a reservation as used. Errors are logged; the generated resume is
/// returned to the user regardless.
pub async fn complete_generation(db: &PgPool, reservation: Reservation, degraded: bool) {
    let result = sqlx::query("UPDATE usage_events SET metadata = metadata || $2 WHERE id = $1")
        .bind(reservation.event_id)
        .bind(json!({ "status": "completed", "degraded": degraded }))
        .execute(db)
        .await;

    if let Err(e) = result {
        error!(
            "Failed to mark generation {} completed: {}",
            reservation.event_id, e
        );
    }
}

/// Returns a reservation whose run failed before producing a resume.
pub async fn release_generation(db: &PgPool, reservation: Reservation) {
    let result = sqlx::query("DELETE FROM usage_events WHERE id = $1")
        .bind(reservation.event_id)
        .execute(db)
        .await;

    match result {
        Ok(_) => info!("Released generation {}", reservation.event_id),
        Err(e) => error!(
            "Failed to release generation {}: {}",
            reservation.event_id, e
        ),
    }
}

/// Metadata stored alongside a generation event.
pub fn generation_metadata(
    stage: &str,
    status: &str,
    degraded: Option<bool>,
    has_job_description: bool,
) -> Value {
    json!({
        "stage": stage,
        "status": status,
        "degraded": degraded,
        "has_job_description": has_job_description,
    })
}

/// A user's plan and how much of it they have used this month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub user_id: Uuid,
    pub tier: Tier,
    pub limits: TierLimits,
    pub monthly_generations: i64,
    pub saved_resumes: i64,
    pub can_generate: bool,
    pub can_save: bool,
}

pub async fn usage_summary(db: &PgPool, user_id: Uuid) -> Result<UsageSummary, AppError> {
    let tier = user_tier(db, user_id).await?;
    let limits = tier.limits();
    let monthly_generations = monthly_generations(db, user_id).await?;
    let saved_resumes = crate::resumes::repository::count_resumes(db, user_id).await?;

    Ok(UsageSummary {
        user_id,
        tier,
        limits,
        monthly_generations,
        saved_resumes,
        can_generate: within_limit(monthly_generations, limits.monthly_generations),
        can_save: within_limit(saved_resumes, limits.max_saved_resumes),
    })
}
