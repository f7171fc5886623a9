use std::collections::HashSet;
use std::sync::LazyLock;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::ApiUser;
use crate::db;
use crate::db::projects::ProjectChanges;
use crate::error::AppError;
use crate::loader::{EntityLoader, Lookup};
use crate::models::Project;
use crate::state::SharedState;
use crate::viewmodels::ProjectWithAuthors;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

#[derive(Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub url: Option<String>,
}

#[derive(Serialize)]
pub struct ProjectCreateResponse {
    pub url: String,
}

#[derive(Deserialize)]
pub struct AuthorEntry {
    pub user_id: Uuid,
    pub position: String,
}

#[derive(Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub theme: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub skills: Option<Vec<String>>,
    pub content: Option<serde_json::Value>,
    pub images: Option<Vec<String>>,
    pub visible: Option<bool>,
    pub authors: Option<Vec<AuthorEntry>>,
}

pub async fn get(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<ProjectWithAuthors>, AppError> {
    EntityLoader::new(&state.store)
        .fetch_unique::<ProjectWithAuthors>(&slug)
        .await?
        .found()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}

pub async fn create(
    auth: ApiUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateProject>,
) -> Result<Json<ProjectCreateResponse>, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    let url = req.url.unwrap_or_else(|| slugify(title));
    validate_slug(&url)?;

    let project = db::projects::create(&state.pool, auth.0.id, &url, title)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("A project with this url already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

    tracing::info!(project_id = %project.id, owner_id = %auth.0.id, url = %project.url, "Project created");

    Ok(Json(ProjectCreateResponse { url: project.url }))
}

pub async fn update(
    auth: ApiUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProject>,
) -> Result<Json<ProjectWithAuthors>, AppError> {
    let project = owned_project(&auth, &state, id).await?;

    if req.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()));
    }

    let authors = match req.authors {
        Some(entries) => Some(validate_authors(entries)?),
        None => None,
    };

    let changes = ProjectChanges {
        title: req.title.map(|t| t.trim().to_string()),
        description: req.description,
        theme: req.theme,
        date: req.date,
        skills: req.skills,
        content: req.content,
        images: req.images,
        visible: req.visible,
    };

    let mut tx = state.pool.begin().await?;
    db::projects::update(&mut *tx, project.id, changes).await?;
    if let Some(authors) = &authors {
        db::projects::replace_authors(&mut tx, project.id, authors)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::BadRequest("Unknown author".to_string())
                }
                _ => AppError::Database(e),
            })?;
    }
    tx.commit().await?;

    tracing::info!(project_id = %project.id, updated_by = %auth.0.id, "Project updated");

    match EntityLoader::new(&state.store)
        .fetch_unique::<ProjectWithAuthors>(&project.url)
        .await?
    {
        Lookup::Found(project) => Ok(Json(project)),
        Lookup::NotFound => Err(AppError::NotFound("Project not found".to_string())),
    }
}

pub async fn delete(
    auth: ApiUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let project = owned_project(&auth, &state, id).await?;
    db::projects::delete(&state.pool, project.id).await?;

    tracing::info!(project_id = %project.id, deleted_by = %auth.0.id, "Project deleted");

    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

/// Load a project the caller may change: its owner or an admin.
async fn owned_project(auth: &ApiUser, state: &SharedState, id: Uuid) -> Result<Project, AppError> {
    let project = db::projects::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    if project.owner_id != auth.0.id && !auth.0.is_admin() {
        return Err(AppError::Forbidden(
            "Only the owner can change this project".to_string(),
        ));
    }
    Ok(project)
}

fn validate_authors(entries: Vec<AuthorEntry>) -> Result<Vec<(Uuid, String)>, AppError> {
    let mut seen = HashSet::new();
    let mut authors = Vec::with_capacity(entries.len());
    for entry in entries {
        let position = entry.position.trim();
        if position.is_empty() {
            return Err(AppError::BadRequest(
                "Every author needs a position".to_string(),
            ));
        }
        if !seen.insert(entry.user_id) {
            return Err(AppError::BadRequest(format!(
                "Author {} is listed twice",
                entry.user_id
            )));
        }
        authors.push((entry.user_id, position.to_string()));
    }
    Ok(authors)
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.is_empty() || slug.len() > 100 {
        return Err(AppError::BadRequest(
            "Url must be between 1 and 100 characters".to_string(),
        ));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(AppError::BadRequest(
            "Url must be lowercase words of letters and digits joined by single hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Hippo 2: The Return!"), "hippo-2-the-return");
        assert_eq!(slugify("  ---  "), "");
    }

    #[test]
    fn validate_slug_rules() {
        assert!(validate_slug("hippo2").is_ok());
        assert!(validate_slug("shop-front").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Hippo").is_err());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug(&"a".repeat(101)).is_err());
    }

    #[test]
    fn authors_need_positions_and_no_repeats() {
        let ada = Uuid::now_v7();
        let ok = validate_authors(vec![AuthorEntry {
            user_id: ada,
            position: " Lead ".to_string(),
        }])
        .unwrap();
        assert_eq!(ok, vec![(ada, "Lead".to_string())]);

        assert!(
            validate_authors(vec![AuthorEntry {
                user_id: ada,
                position: "  ".to_string(),
            }])
            .is_err()
        );

        assert!(
            validate_authors(vec![
                AuthorEntry {
                    user_id: ada,
                    position: "Lead".to_string(),
                },
                AuthorEntry {
                    user_id: ada,
                    position: "Design".to_string(),
                },
            ])
            .is_err()
        );
    }
}
