use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub url: String,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub theme: String,
    pub date: DateTime<Utc>,
    pub skills: Vec<String>,
    pub content: serde_json::Value,
    pub images: Vec<String>,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user credited on a project, with the position they held.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub user: User,
    pub position: String,
}
