use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{NewResume, ResumeChanges};
use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeSummaryRow};
use crate::usage;

/// Inserts a resume if the user's tier has room for it. The count and the
/// insert share a transaction under the user's row lock.
pub async fn create_resume(
    db: &PgPool,
    user_id: Uuid,
    new: &NewResume,
) -> Result<ResumeRow, AppError> {
    let mut tx = db.begin().await?;

    let tier = usage::lock_user_tier(&mut *tx, user_id).await?;
    let saved = count_resumes(&mut *tx, user_id).await?;
    usage::check_can_save(tier, saved)?;

    let row: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes (user_id, title, content, source_text, job_description, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&new.title)
    .bind(&new.content)
    .bind(&new.source_text)
    .bind(&new.job_description)
    .bind(&new.metadata)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(row)
}

pub async fn list_resumes(db: &PgPool, user_id: Uuid) -> Result<Vec<ResumeSummaryRow>, AppError> {
    let rows: Vec<ResumeSummaryRow> = sqlx::query_as(
        r#"
        SELECT id, title, metadata, version, created_at, updated_at
        FROM resumes
        WHERE user_id = $1 AND is_deleted = FALSE
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get_resume(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<ResumeRow, AppError> {
    let row: Option<ResumeRow> = sqlx::query_as(
        "SELECT * FROM resumes WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    row.ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// Applies `changes` and bumps `version`. Metadata keys are merged shallowly.
pub async fn update_resume(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    changes: &ResumeChanges,
) -> Result<ResumeRow, AppError> {
    let row: Option<ResumeRow> = sqlx::query_as(
        r#"
        UPDATE resumes
        SET title      = COALESCE($3, title),
            content    = COALESCE($4, content),
            metadata   = metadata || $5,
            version    = version + 1,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&changes.title)
    .bind(&changes.content)
    .bind(&changes.metadata)
    .fetch_optional(db)
    .await?;

    row.ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// Sets the delete flag; the row itself is retained.
pub async fn soft_delete_resume(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE resumes
        SET is_deleted = TRUE, updated_at = NOW()
        WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    Ok(())
}

pub async fn count_resumes<'e, E>(db: E, user_id: Uuid) -> Result<i64, AppError>
where
    E: PgExecutor<'e>,
{
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM resumes WHERE user_id = $1 AND is_deleted = FALSE")
            .bind(user_id)
            .fetch_one(db)
            .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // Postgres-backed: run with DATABASE_URL set and `cargo test -- --ignored`.

    async fn create_user(db: &PgPool, tier: &str) -> Uuid {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO users (external_id, email, tier) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(Uuid::new_v4().to_string())
        .bind("jane@example.com")
        .bind(tier)
        .fetch_one(db)
        .await
        .unwrap();
        id
    }

    fn new_resume(title: &str) -> NewResume {
        NewResume {
            title: title.to_string(),
            content: "**Jane Doe**\nBoston, MA".to_string(),
            source_text: None,
            job_description: None,
            metadata: json!({ "company": "Initech", "job_title": "CTO" }),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs Postgres"]
    async fn test_update_bumps_version_and_merges_metadata(db: PgPool) {
        let user_id = create_user(&db, "FREE").await;
        let created = create_resume(&db, user_id, &new_resume("Backend")).await.unwrap();
        assert_eq!(created.version, 1);

        let changes = ResumeChanges {
            title: Some("Backend (Rust)".to_string()),
            content: None,
            metadata: json!({ "company": "Hooli", "name": "Jane" }),
        };
        let updated = update_resume(&db, user_id, created.id, &changes).await.unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.title, "Backend (Rust)");
        assert_eq!(updated.content, created.content);
        assert_eq!(
            updated.metadata,
            json!({ "company": "Hooli", "job_title": "CTO", "name": "Jane" })
        );
        assert!(updated.updated_at >= created.updated_at);

        let again = update_resume(&db, user_id, created.id, &changes).await.unwrap();
        assert_eq!(again.version, 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs Postgres"]
    async fn test_soft_delete_hides_the_row(db: PgPool) {
        let user_id = create_user(&db, "FREE").await;
        let kept = create_resume(&db, user_id, &new_resume("Kept")).await.unwrap();
        let gone = create_resume(&db, user_id, &new_resume("Gone")).await.unwrap();

        soft_delete_resume(&db, user_id, gone.id).await.unwrap();

        assert!(matches!(
            get_resume(&db, user_id, gone.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            soft_delete_resume(&db, user_id, gone.id).await,
            Err(AppError::NotFound(_))
        ));
        let listed: Vec<Uuid> = list_resumes(&db, user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, vec![kept.id]);
        assert_eq!(count_resumes(&db, user_id).await.unwrap(), 1);

        // The row is retained.
        let (flag,): (bool,) = sqlx::query_as("SELECT is_deleted FROM resumes WHERE id = $1")
            .bind(gone.id)
            .fetch_one(&db)
            .await
            .unwrap();
        assert!(flag);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs Postgres"]
    async fn test_rows_are_scoped_to_their_owner(db: PgPool) {
        let owner = create_user(&db, "FREE").await;
        let other = create_user(&db, "FREE").await;
        let resume = create_resume(&db, owner, &new_resume("Mine")).await.unwrap();

        assert!(matches!(
            get_resume(&db, other, resume.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(list_resumes(&db, other).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs Postgres"]
    async fn test_free_tier_saved_resume_limit(db: PgPool) {
        let user_id = create_user(&db, "FREE").await;
        for i in 0..5 {
            create_resume(&db, user_id, &new_resume(&format!("Resume {i}")))
                .await
                .unwrap();
        }

        let err = create_resume(&db, user_id, &new_resume("Sixth")).await.unwrap_err();
        assert!(matches!(err, AppError::UsageLimitReached(_)));

        let pro = create_user(&db, "PRO").await;
        for i in 0..6 {
            create_resume(&db, pro, &new_resume(&format!("Resume {i}")))
                .await
                .unwrap();
        }
        assert_eq!(count_resumes(&db, pro).await.unwrap(), 6);
    }
}
