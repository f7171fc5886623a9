use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{
    Graph, ProjectFilter, ProjectGraph, ProjectInclude, Store, UserFilter, UserGraph, UserInclude,
};
use crate::models::{Author, Project, ReceivedEndorsement, User, UserLinks};
use crate::viewmodels::ProjectWithAuthors;

/// Authors of the project aliased `p`, as a JSON array (never NULL).
/// Credentials and email addresses stay out of the author objects.
const PROJECT_AUTHORS: &str = "COALESCE((
    SELECT json_agg(
        json_build_object('user', to_jsonb(au) - 'password_hash' - 'email', 'position', pa.position)
        ORDER BY pa.created_at, au.name
    )
    FROM project_authors pa
    JOIN users au ON au.id = pa.user_id
    WHERE pa.project_id = p.id
), '[]'::json)";

const USER_LINKS: &str = "COALESCE((
    SELECT to_jsonb(l) - 'user_id' FROM links l WHERE l.user_id = u.id
), '{}'::jsonb)";

const USER_ENDORSEMENTS: &str = "COALESCE((
    SELECT json_agg(
        json_build_object(
            'id', e.id,
            'kind', e.kind,
            'skill', e.skill,
            'created_at', e.created_at,
            'from', json_build_object('id', f.id, 'url', f.url, 'name', f.name)
        )
        ORDER BY e.created_at DESC
    )
    FROM endorsements e
    JOIN users f ON f.id = e.from_id
    WHERE e.to_id = u.id
), '[]'::json)";

/// Postgres-backed store. Every relation named by the inclusion descriptor is
/// resolved by a JSON sub-select, so one fetch is one statement.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    #[sqlx(flatten)]
    project: Project,
    authors: Option<Json<Vec<Author>>>,
}

impl From<ProjectRow> for ProjectGraph {
    fn from(row: ProjectRow) -> Self {
        ProjectGraph {
            project: row.project,
            authors: row.authors.map(|Json(authors)| authors).into(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    #[sqlx(flatten)]
    user: User,
    links: Option<Json<UserLinks>>,
    pinned_project: Option<Json<Vec<ProjectWithAuthors>>>,
    endorsements_received: Option<Json<Vec<ReceivedEndorsement>>>,
}

impl From<UserRow> for UserGraph {
    fn from(row: UserRow) -> Self {
        UserGraph {
            user: row.user,
            links: row.links.map(|Json(links)| links).into(),
            pinned_project: row
                .pinned_project
                .map(|Json(pinned)| pinned.into_iter().next())
                .into(),
            endorsements_received: row
                .endorsements_received
                .map(|Json(endorsements)| endorsements)
                .into(),
        }
    }
}

fn project_select(include: &ProjectInclude) -> QueryBuilder<'static, Postgres> {
    let authors = if include.authors {
        PROJECT_AUTHORS
    } else {
        "NULL::json"
    };
    QueryBuilder::new(format!("SELECT p.*, {authors} AS authors FROM projects p"))
}

fn push_project_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter) {
    match filter {
        ProjectFilter::Url(url) => {
            qb.push(" WHERE p.url = ").push_bind(url.clone());
        }
        ProjectFilter::UrlIn(urls) => {
            qb.push(" WHERE p.url = ANY(").push_bind(urls.clone()).push(")");
        }
        ProjectFilter::OwnedOrAuthored { user_id, visible } => {
            qb.push(" WHERE (p.owner_id = ")
                .push_bind(*user_id)
                .push(
                    " OR EXISTS (SELECT 1 FROM project_authors co
                     WHERE co.project_id = p.id AND co.user_id = ",
                )
                .push_bind(*user_id)
                .push(")) AND p.visible = ")
                .push_bind(*visible);
        }
        ProjectFilter::Visible => {
            qb.push(" WHERE p.visible = true");
        }
    }
}

fn user_select(include: &UserInclude) -> QueryBuilder<'static, Postgres> {
    let links = if include.links {
        USER_LINKS.to_string()
    } else {
        "NULL::jsonb".to_string()
    };
    let pinned = if include.pinned_project {
        format!(
            "COALESCE((
                SELECT json_agg(to_jsonb(p) || jsonb_build_object('authors', {PROJECT_AUTHORS}))
                FROM projects p
                WHERE p.id = u.pinned_project_id
            ), '[]'::json)"
        )
    } else {
        "NULL::json".to_string()
    };
    let endorsements = if include.endorsements_received {
        USER_ENDORSEMENTS.to_string()
    } else {
        "NULL::json".to_string()
    };
    QueryBuilder::new(format!(
        "SELECT u.*, {links} AS links, {pinned} AS pinned_project, \
         {endorsements} AS endorsements_received FROM users u"
    ))
}

fn push_user_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    match filter {
        UserFilter::Url(url) => {
            qb.push(" WHERE u.url = ").push_bind(url.clone());
        }
        UserFilter::UrlIn(urls) => {
            qb.push(" WHERE u.url = ANY(").push_bind(urls.clone()).push(")");
        }
        UserFilter::Homepage => {
            qb.push(" WHERE u.homepage = true");
        }
        UserFilter::Visible => {
            qb.push(" WHERE u.visible = true");
        }
    }
}

#[async_trait]
impl Store<ProjectGraph> for PgStore {
    async fn find_unique(
        &self,
        slug: &str,
        include: &ProjectInclude,
    ) -> Result<Option<ProjectGraph>, sqlx::Error> {
        let mut qb = project_select(include);
        push_project_filter(&mut qb, &ProjectFilter::Url(slug.to_string()));
        let row = qb
            .build_query_as::<ProjectRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ProjectGraph::from))
    }

    async fn find_many(
        &self,
        filter: &ProjectFilter,
        include: &ProjectInclude,
    ) -> Result<Vec<ProjectGraph>, sqlx::Error> {
        let mut qb = project_select(include);
        push_project_filter(&mut qb, filter);
        qb.push(" ORDER BY p.date DESC, p.created_at DESC");
        let rows = qb
            .build_query_as::<ProjectRow>()
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!(
            entity = ProjectGraph::ENTITY,
            count = rows.len(),
            "Loaded project graphs"
        );
        Ok(rows.into_iter().map(ProjectGraph::from).collect())
    }
}

#[async_trait]
impl Store<UserGraph> for PgStore {
    async fn find_unique(
        &self,
        slug: &str,
        include: &UserInclude,
    ) -> Result<Option<UserGraph>, sqlx::Error> {
        let mut qb = user_select(include);
        push_user_filter(&mut qb, &UserFilter::Url(slug.to_string()));
        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UserGraph::from))
    }

    async fn find_many(
        &self,
        filter: &UserFilter,
        include: &UserInclude,
    ) -> Result<Vec<UserGraph>, sqlx::Error> {
        let mut qb = user_select(include);
        push_user_filter(&mut qb, filter);
        qb.push(" ORDER BY u.name, u.created_at");
        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!(
            entity = UserGraph::ENTITY,
            count = rows.len(),
            "Loaded user graphs"
        );
        Ok(rows.into_iter().map(UserGraph::from).collect())
    }
}
