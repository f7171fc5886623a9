use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SkillKind {
    Soft,
    Tech,
}

impl SkillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillKind::Soft => "soft",
            SkillKind::Tech => "tech",
        }
    }
}

/// Stripped-down user shown next to an endorsement on a profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Endorser {
    pub id: Uuid,
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceivedEndorsement {
    pub id: Uuid,
    pub kind: SkillKind,
    pub skill: String,
    pub created_at: DateTime<Utc>,
    pub from: Endorser,
}
