use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::auth::extractor::ApiUser;
use crate::db;
use crate::db::users::UserChanges;
use crate::error::AppError;
use crate::loader::{EntityLoader, Lookup};
use crate::models::{ROLE_ADMIN, ROLE_MEMBER, UserLinks};
use crate::state::SharedState;
use crate::viewmodels::{ProfilePage, UserWithMetadata, load_profile};

/// A missing field stays `None`; an explicit `null` becomes `Some(None)`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub role: Option<String>,
    pub name: Option<String>,
    pub about: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub team: Option<Option<String>>,
    pub positions: Option<Vec<String>>,
    pub soft_skills: Option<Vec<String>>,
    pub tech_skills: Option<Vec<String>>,
    pub links: Option<UserLinks>,
    #[serde(default, deserialize_with = "nullable")]
    pub pinned_project_id: Option<Option<Uuid>>,
    pub visible: Option<bool>,
    pub homepage: Option<bool>,
}

/// Public profile as JSON. API callers get a 404 rather than a redirect.
pub async fn get(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<ProfilePage>, AppError> {
    load_profile(&state.store, &slug)
        .await?
        .found()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn update(
    auth: ApiUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UserUpdateRequest>,
) -> Result<Json<UserWithMetadata>, AppError> {
    auth.require_self_or_admin(id)?;

    if let Some(role) = &req.role {
        if !auth.0.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can change roles".to_string(),
            ));
        }
        if role != ROLE_ADMIN && role != ROLE_MEMBER {
            return Err(AppError::BadRequest(format!("Unknown role '{role}'")));
        }
    }

    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    if let Some(links) = &req.links {
        links.validate().map_err(AppError::BadRequest)?;
    }

    if let Some(Some(project_id)) = req.pinned_project_id {
        if !db::projects::is_credited(&state.pool, project_id, id).await? {
            return Err(AppError::BadRequest(
                "You can only pin projects you own or authored".to_string(),
            ));
        }
    }

    let changes = UserChanges {
        role: req.role,
        name: req.name.map(|n| n.trim().to_string()),
        about: req.about,
        team: req.team,
        positions: req.positions,
        soft_skills: req.soft_skills,
        tech_skills: req.tech_skills,
        pinned_project_id: req.pinned_project_id,
        visible: req.visible,
        homepage: req.homepage,
    };

    let mut tx = state.pool.begin().await?;
    let user = db::users::update(&mut *tx, id, changes)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("User not found".to_string()),
            _ => AppError::Database(e),
        })?;
    if let Some(links) = &req.links {
        db::links::upsert(&mut *tx, id, links).await?;
    }
    tx.commit().await?;

    tracing::info!(user_id = %id, updated_by = %auth.0.id, "Profile updated");

    match EntityLoader::new(&state.store)
        .fetch_unique::<UserWithMetadata>(&user.url)
        .await?
    {
        Lookup::Found(user) => Ok(Json(user)),
        Lookup::NotFound => Err(AppError::NotFound("User not found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_nullable_fields_are_left_alone() {
        let req: UserUpdateRequest = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(req.team, None);
        assert_eq!(req.pinned_project_id, None);
    }

    #[test]
    fn null_clears_nullable_fields() {
        let req: UserUpdateRequest =
            serde_json::from_str(r#"{"team":null,"pinned_project_id":null}"#).unwrap();
        assert_eq!(req.team, Some(None));
        assert_eq!(req.pinned_project_id, Some(None));
    }

    #[test]
    fn values_set_nullable_fields() {
        let id = Uuid::now_v7();
        let req: UserUpdateRequest =
            serde_json::from_value(serde_json::json!({ "team": "Core", "pinned_project_id": id }))
                .unwrap();
        assert_eq!(req.team, Some(Some("Core".to_string())));
        assert_eq!(req.pinned_project_id, Some(Some(id)));
    }
}
