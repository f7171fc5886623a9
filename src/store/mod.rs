//! Persistence collaborator for the read side of the site.
//!
//! A store answers two questions per entity graph: "the one entity with this
//! slug" and "every entity matching this filter", each with the relations
//! named by an inclusion descriptor resolved in the same query.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::loader::LoadError;
use crate::models::{Author, Project, ReceivedEndorsement, User, UserLinks};
use crate::viewmodels::ProjectWithAuthors;

pub use postgres::PgStore;

/// A relation slot on an entity graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation<T> {
    /// Not requested by the inclusion descriptor.
    Omitted,
    Resolved(T),
}

impl<T> Relation<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Relation::Resolved(_))
    }

    /// Take the resolved value, or fail naming the missing relation.
    pub fn resolve(self, entity: &'static str, relation: &'static str) -> Result<T, LoadError> {
        match self {
            Relation::Resolved(value) => Ok(value),
            Relation::Omitted => Err(LoadError::Unresolved { entity, relation }),
        }
    }
}

impl<T> From<Option<T>> for Relation<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Relation::Resolved(v),
            None => Relation::Omitted,
        }
    }
}

/// An entity row plus whatever relations were resolved alongside it.
pub trait Graph: Send + Sized + 'static {
    type Filter: Send + Sync;
    type Include: Send + Sync;

    /// Entity name used in logs and errors.
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
    fn slug(&self) -> &str;

    /// Set-membership filter over slugs.
    fn slug_in(slugs: Vec<String>) -> Self::Filter;
}

#[async_trait]
pub trait Store<G: Graph>: Send + Sync {
    async fn find_unique(
        &self,
        slug: &str,
        include: &G::Include,
    ) -> Result<Option<G>, sqlx::Error>;

    async fn find_many(
        &self,
        filter: &G::Filter,
        include: &G::Include,
    ) -> Result<Vec<G>, sqlx::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectFilter {
    Url(String),
    UrlIn(Vec<String>),
    /// Projects the user owns or co-authored, with the given visibility.
    OwnedOrAuthored { user_id: Uuid, visible: bool },
    Visible,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectInclude {
    pub authors: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectGraph {
    pub project: Project,
    pub authors: Relation<Vec<Author>>,
}

impl Graph for ProjectGraph {
    type Filter = ProjectFilter;
    type Include = ProjectInclude;

    const ENTITY: &'static str = "project";

    fn id(&self) -> Uuid {
        self.project.id
    }

    fn slug(&self) -> &str {
        &self.project.url
    }

    fn slug_in(slugs: Vec<String>) -> ProjectFilter {
        ProjectFilter::UrlIn(slugs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserFilter {
    Url(String),
    UrlIn(Vec<String>),
    /// Users featured on the landing page.
    Homepage,
    Visible,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserInclude {
    pub links: bool,
    pub pinned_project: bool,
    pub endorsements_received: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserGraph {
    pub user: User,
    pub links: Relation<UserLinks>,
    pub pinned_project: Relation<Option<ProjectWithAuthors>>,
    pub endorsements_received: Relation<Vec<ReceivedEndorsement>>,
}

impl Graph for UserGraph {
    type Filter = UserFilter;
    type Include = UserInclude;

    const ENTITY: &'static str = "user";

    fn id(&self) -> Uuid {
        self.user.id
    }

    fn slug(&self) -> &str {
        &self.user.url
    }

    fn slug_in(slugs: Vec<String>) -> UserFilter {
        UserFilter::UrlIn(slugs)
    }
}
