//! Presentation shapes handed to templates and JSON responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::loader::{EntityLoader, LoadError, Lookup, ViewModel};
use crate::models::{Author, Project, ReceivedEndorsement, SkillKind, User, UserLinks};
use crate::store::{
    Graph, ProjectFilter, ProjectGraph, ProjectInclude, Store, UserGraph, UserInclude,
};

/// A project together with its credited authors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectWithAuthors {
    #[serde(flatten)]
    pub project: Project,
    pub authors: Vec<Author>,
}

impl ViewModel for ProjectWithAuthors {
    type Graph = ProjectGraph;

    fn include() -> ProjectInclude {
        ProjectInclude { authors: true }
    }

    fn compose(graph: ProjectGraph) -> Result<Self, LoadError> {
        Ok(Self {
            authors: graph.authors.resolve(ProjectGraph::ENTITY, "authors")?,
            project: graph.project,
        })
    }
}

/// Developer card for the landing page and the developer listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeveloperCard {
    pub id: Uuid,
    pub url: String,
    pub name: String,
    pub team: Option<String>,
    pub about: String,
    pub soft_skills: Vec<String>,
    pub tech_skills: Vec<String>,
}

impl DeveloperCard {
    pub fn team_name(&self) -> &str {
        self.team.as_deref().unwrap_or("")
    }
}

impl ViewModel for DeveloperCard {
    type Graph = UserGraph;

    fn include() -> UserInclude {
        UserInclude::default()
    }

    fn compose(graph: UserGraph) -> Result<Self, LoadError> {
        let user = graph.user;
        Ok(Self {
            id: user.id,
            url: user.url,
            name: user.name,
            team: user.team,
            about: user.about,
            soft_skills: user.soft_skills,
            tech_skills: user.tech_skills,
        })
    }
}

/// A user with links, pinned project and received endorsements.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserWithMetadata {
    #[serde(flatten)]
    pub user: User,
    pub links: UserLinks,
    pub pinned_project: Option<ProjectWithAuthors>,
    pub endorsements_received: Vec<ReceivedEndorsement>,
}

impl ViewModel for UserWithMetadata {
    type Graph = UserGraph;

    fn include() -> UserInclude {
        UserInclude {
            links: true,
            pinned_project: true,
            endorsements_received: true,
        }
    }

    fn compose(graph: UserGraph) -> Result<Self, LoadError> {
        let entity = UserGraph::ENTITY;
        Ok(Self {
            links: graph.links.resolve(entity, "links")?,
            pinned_project: graph.pinned_project.resolve(entity, "pinned_project")?,
            endorsements_received: graph
                .endorsements_received
                .resolve(entity, "endorsements_received")?,
            user: graph.user,
        })
    }
}

/// How many endorsements a user received for one skill.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Kudo {
    pub kind: SkillKind,
    pub skill: String,
    pub count: usize,
}

/// Tally endorsements per skill, most endorsed first.
pub fn kudos(endorsements: &[ReceivedEndorsement]) -> Vec<Kudo> {
    let mut tally: BTreeMap<(SkillKind, &str), usize> = BTreeMap::new();
    for endorsement in endorsements {
        *tally
            .entry((endorsement.kind, endorsement.skill.as_str()))
            .or_default() += 1;
    }

    let mut kudos: Vec<Kudo> = tally
        .into_iter()
        .map(|((kind, skill), count)| Kudo {
            kind,
            skill: skill.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the (kind, skill) order among equal counts.
    kudos.sort_by(|a, b| b.count.cmp(&a.count));
    kudos
}

/// Everything the developer profile page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub user_page: UserWithMetadata,
    pub projects: Vec<ProjectWithAuthors>,
    pub kudos: Vec<Kudo>,
}

pub async fn load_profile<S>(store: &S, slug: &str) -> Result<Lookup<ProfilePage>, LoadError>
where
    S: Store<UserGraph> + Store<ProjectGraph> + ?Sized,
{
    let loader = EntityLoader::new(store);
    let Lookup::Found(user_page) = loader.fetch_unique::<UserWithMetadata>(slug).await? else {
        return Ok(Lookup::NotFound);
    };

    let projects = loader
        .fetch_many::<ProjectWithAuthors>(&ProjectFilter::OwnedOrAuthored {
            user_id: user_page.user.id,
            visible: true,
        })
        .await?;
    let kudos = kudos(&user_page.endorsements_received);

    Ok(Lookup::Found(ProfilePage {
        user_page,
        projects,
        kudos,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Endorser;
    use crate::store::Relation;

    fn endorsement(kind: SkillKind, skill: &str) -> ReceivedEndorsement {
        ReceivedEndorsement {
            id: Uuid::now_v7(),
            kind,
            skill: skill.to_string(),
            created_at: Utc::now(),
            from: Endorser {
                id: Uuid::now_v7(),
                url: "someone".to_string(),
                name: "Someone".to_string(),
            },
        }
    }

    #[test]
    fn kudos_count_per_skill_most_endorsed_first() {
        let received = vec![
            endorsement(SkillKind::Tech, "Rust"),
            endorsement(SkillKind::Soft, "Leadership"),
            endorsement(SkillKind::Tech, "Rust"),
            endorsement(SkillKind::Tech, "Go"),
            endorsement(SkillKind::Soft, "Leadership"),
            endorsement(SkillKind::Tech, "Rust"),
        ];

        let kudos = kudos(&received);

        assert_eq!(
            kudos,
            vec![
                Kudo {
                    kind: SkillKind::Tech,
                    skill: "Rust".to_string(),
                    count: 3
                },
                Kudo {
                    kind: SkillKind::Soft,
                    skill: "Leadership".to_string(),
                    count: 2
                },
                Kudo {
                    kind: SkillKind::Tech,
                    skill: "Go".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn kudos_keep_soft_and_tech_skills_apart() {
        let received = vec![
            endorsement(SkillKind::Soft, "Design"),
            endorsement(SkillKind::Tech, "Design"),
        ];

        let kudos = kudos(&received);

        assert_eq!(kudos.len(), 2);
        assert!(kudos.iter().all(|k| k.count == 1));
    }

    #[test]
    fn kudos_of_nothing_is_empty() {
        assert!(kudos(&[]).is_empty());
    }

    #[test]
    fn project_without_authors_slot_fails_to_compose() {
        let graph = ProjectGraph {
            project: Project {
                id: Uuid::now_v7(),
                url: "hippo2".to_string(),
                owner_id: Uuid::now_v7(),
                title: "Hippo".to_string(),
                description: String::new(),
                theme: String::new(),
                date: Utc::now(),
                skills: vec![],
                content: serde_json::json!({}),
                images: vec![],
                visible: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            authors: Relation::Omitted,
        };

        let err = ProjectWithAuthors::compose(graph).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Unresolved {
                entity: "project",
                relation: "authors"
            }
        ));
    }

    #[test]
    fn profile_json_strips_link_owner_email_and_password() {
        let user_page = UserWithMetadata {
            user: User {
                id: Uuid::now_v7(),
                url: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "secret-hash".to_string(),
                name: "Ada".to_string(),
                about: String::new(),
                team: None,
                role: "member".to_string(),
                positions: vec![],
                soft_skills: vec![],
                tech_skills: vec![],
                pinned_project_id: None,
                visible: true,
                homepage: false,
                created_at: Utc::now(),
            },
            links: UserLinks::default(),
            pinned_project: None,
            endorsements_received: vec![],
        };

        let json = serde_json::to_value(&user_page).unwrap();

        assert_eq!(json["url"], "ada");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_none());
        assert!(json["links"].is_object());
        assert!(json["links"].get("user_id").is_none());
        assert!(json["pinned_project"].is_null());
    }
}
