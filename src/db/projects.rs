use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::Project;

/// Field changes for a project update. `None` leaves the column as is.
#[derive(Debug, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub theme: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub skills: Option<Vec<String>>,
    pub content: Option<serde_json::Value>,
    pub images: Option<Vec<String>>,
    pub visible: Option<bool>,
}

pub async fn create(
    pool: &PgPool,
    owner_id: Uuid,
    url: &str,
    title: &str,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects (id, url, owner_id, title) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(url)
    .bind(owner_id)
    .bind(title)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    changes: ProjectChanges,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "UPDATE projects SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            theme = COALESCE($4, theme),
            date = COALESCE($5, date),
            skills = COALESCE($6, skills),
            content = COALESCE($7, content),
            images = COALESCE($8, images),
            visible = COALESCE($9, visible),
            updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.theme)
    .bind(changes.date)
    .bind(changes.skills)
    .bind(changes.content)
    .bind(changes.images)
    .bind(changes.visible)
    .fetch_one(executor)
    .await
}

/// Replace the author list of a project.
pub async fn replace_authors(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    authors: &[(Uuid, String)],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_authors WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut **tx)
        .await?;

    for (user_id, position) in authors {
        sqlx::query(
            "INSERT INTO project_authors (project_id, user_id, position) VALUES ($1, $2, $3)
             ON CONFLICT (project_id, user_id) DO UPDATE SET position = EXCLUDED.position",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(position)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Whether the user owns or co-authored the project.
pub async fn is_credited(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
            SELECT 1 FROM projects p
            WHERE p.id = $1 AND (p.owner_id = $2 OR EXISTS (
                SELECT 1 FROM project_authors pa WHERE pa.project_id = p.id AND pa.user_id = $2
            ))
        )",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}
