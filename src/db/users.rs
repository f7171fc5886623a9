use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

pub struct NewUser<'a> {
    pub url: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: &'a str,
}

/// Field changes for a profile update. `None` leaves the column as is;
/// for the nullable columns `Some(None)` clears it.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub role: Option<String>,
    pub name: Option<String>,
    pub about: Option<String>,
    pub team: Option<Option<String>>,
    pub positions: Option<Vec<String>>,
    pub soft_skills: Option<Vec<String>>,
    pub tech_skills: Option<Vec<String>>,
    pub pinned_project_id: Option<Option<Uuid>>,
    pub visible: Option<bool>,
    pub homepage: Option<bool>,
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    new: &NewUser<'_>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, url, email, password_hash, name, role)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(new.url)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.name)
    .bind(new.role)
    .fetch_one(executor)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    changes: UserChanges,
) -> Result<User, sqlx::Error> {
    let set_team = changes.team.is_some();
    let set_pinned = changes.pinned_project_id.is_some();

    sqlx::query_as::<_, User>(
        "UPDATE users SET
            role = COALESCE($2, role),
            name = COALESCE($3, name),
            about = COALESCE($4, about),
            team = CASE WHEN $12 THEN $5 ELSE team END,
            positions = COALESCE($6, positions),
            soft_skills = COALESCE($7, soft_skills),
            tech_skills = COALESCE($8, tech_skills),
            pinned_project_id = CASE WHEN $13 THEN $9 ELSE pinned_project_id END,
            visible = COALESCE($10, visible),
            homepage = COALESCE($11, homepage)
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.role)
    .bind(changes.name)
    .bind(changes.about)
    .bind(changes.team.flatten())
    .bind(changes.positions)
    .bind(changes.soft_skills)
    .bind(changes.tech_skills)
    .bind(changes.pinned_project_id.flatten())
    .bind(changes.visible)
    .bind(changes.homepage)
    .bind(set_team)
    .bind(set_pinned)
    .fetch_one(executor)
    .await
}
