use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::ApiUser;
use crate::db;
use crate::error::AppError;
use crate::models::{SkillKind, User};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct EndorsementRequest {
    /// The user being endorsed.
    pub id: Uuid,
    pub endorsing: bool,
    pub soft_skill: Option<String>,
    pub tech_skill: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EndorsementResponse {
    pub endorsed: bool,
    /// False when the request matched the stored state already.
    pub changed: bool,
}

/// Pick the single skill the request names.
fn requested_skill(req: &EndorsementRequest) -> Result<(SkillKind, &str), AppError> {
    let soft = req.soft_skill.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let tech = req.tech_skill.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match (soft, tech) {
        (Some(skill), None) => Ok((SkillKind::Soft, skill)),
        (None, Some(skill)) => Ok((SkillKind::Tech, skill)),
        _ => Err(AppError::BadRequest(
            "Name exactly one of soft_skill or tech_skill".to_string(),
        )),
    }
}

fn lists_skill(user: &User, kind: SkillKind, skill: &str) -> bool {
    let skills = match kind {
        SkillKind::Soft => &user.soft_skills,
        SkillKind::Tech => &user.tech_skills,
    };
    skills.iter().any(|s| s == skill)
}

pub async fn set(
    auth: ApiUser,
    State(state): State<SharedState>,
    Json(req): Json<EndorsementRequest>,
) -> Result<Json<EndorsementResponse>, AppError> {
    let (kind, skill) = requested_skill(&req)?;

    if req.id == auth.0.id {
        return Err(AppError::BadRequest("You cannot endorse yourself".to_string()));
    }

    let target = db::users::find_by_id(&state.pool, req.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let changed = if req.endorsing {
        if !lists_skill(&target, kind, skill) {
            return Err(AppError::BadRequest(format!(
                "{} does not list the {} skill '{skill}'",
                target.name,
                kind.as_str()
            )));
        }
        db::endorsements::add(&state.pool, auth.0.id, target.id, kind, skill).await?
    } else {
        db::endorsements::remove(&state.pool, auth.0.id, target.id, kind, skill).await?
    };

    if changed {
        tracing::info!(
            from_id = %auth.0.id,
            to_id = %target.id,
            kind = kind.as_str(),
            skill,
            endorsing = req.endorsing,
            "Endorsement changed"
        );
    }

    Ok(Json(EndorsementResponse {
        endorsed: req.endorsing,
        changed,
    }))
}
