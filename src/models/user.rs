use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub url: String,
    #[serde(skip_serializing, default)]
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub about: String,
    pub team: Option<String>,
    pub role: String,
    pub positions: Vec<String>,
    pub soft_skills: Vec<String>,
    pub tech_skills: Vec<String>,
    pub pinned_project_id: Option<Uuid>,
    pub visible: bool,
    pub homepage: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
