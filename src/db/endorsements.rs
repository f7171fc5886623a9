use sqlx::PgPool;
use uuid::Uuid;

use crate::models::SkillKind;

/// Record an endorsement. Returns false if it already existed.
pub async fn add(
    pool: &PgPool,
    from_id: Uuid,
    to_id: Uuid,
    kind: SkillKind,
    skill: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO endorsements (id, from_id, to_id, kind, skill) VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (from_id, to_id, kind, skill) DO NOTHING",
    )
    .bind(Uuid::now_v7())
    .bind(from_id)
    .bind(to_id)
    .bind(kind.as_str())
    .bind(skill)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Withdraw an endorsement. Returns false if there was none.
pub async fn remove(
    pool: &PgPool,
    from_id: Uuid,
    to_id: Uuid,
    kind: SkillKind,
    skill: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM endorsements
         WHERE from_id = $1 AND to_id = $2 AND kind = $3 AND skill = $4",
    )
    .bind(from_id)
    .bind(to_id)
    .bind(kind.as_str())
    .bind(skill)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
