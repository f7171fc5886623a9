use uuid::Uuid;

use crate::models::UserLinks;

pub async fn upsert<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    links: &UserLinks,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO links (user_id, devto, facebook, github, linkedin, twitter, website)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (user_id) DO UPDATE SET
            devto = EXCLUDED.devto,
            facebook = EXCLUDED.facebook,
            github = EXCLUDED.github,
            linkedin = EXCLUDED.linkedin,
            twitter = EXCLUDED.twitter,
            website = EXCLUDED.website",
    )
    .bind(user_id)
    .bind(&links.devto)
    .bind(&links.facebook)
    .bind(&links.github)
    .bind(&links.linkedin)
    .bind(&links.twitter)
    .bind(&links.website)
    .execute(executor)
    .await?;
    Ok(())
}
